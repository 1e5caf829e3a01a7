//! WebSocket transport to the session host.
//!
//! One protocol message per text frame. Ping/pong frames are handled by the
//! library; binary frames do not belong to the protocol and are reported as
//! violations without closing the channel.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use lmsh_core::error::{Error, Result};
use lmsh_core::protocol::{Codec, Message};
use lmsh_core::transport::{Channel, Transport};

/// WebSocket channel factory for a fixed host URL.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: Url,
}

impl WsTransport {
    /// Validate the URL and build the transport.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::Transport {
            message: format!("invalid url: {e}"),
        })?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self { url }),
            other => Err(Error::Transport {
                message: format!("unsupported url scheme: {other}"),
            }),
        }
    }

    /// The host URL this transport dials.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn Channel>> {
        debug!(url = %self.url, "opening websocket");
        let (stream, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| Error::Transport {
                    message: format!("websocket connect failed: {e}"),
                })?;
        Ok(Box::new(WsChannel { inner: stream }))
    }
}

struct WsChannel {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Channel for WsChannel {
    async fn send(&mut self, msg: &Message) -> Result<()> {
        let text = Codec::encode(msg)?;
        self.inner
            .send(WsMessage::Text(text))
            .await
            .map_err(map_ws_error)
    }

    async fn recv(&mut self) -> Result<Message> {
        loop {
            match self.inner.next().await {
                None => return Err(Error::ConnectionClosed),
                Some(Err(e)) => return Err(map_ws_error(e)),
                Some(Ok(WsMessage::Text(text))) => return Codec::decode(&text),
                Some(Ok(WsMessage::Binary(_))) => {
                    return Err(Error::Protocol {
                        message: "unexpected binary frame".into(),
                    });
                }
                Some(Ok(WsMessage::Close(_))) => return Err(Error::ConnectionClosed),
                // Keepalive frames carry no protocol payload.
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.inner.close(None).await;
    }
}

fn map_ws_error(e: WsError) -> Error {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => Error::ConnectionClosed,
        other => Error::Transport {
            message: other.to_string(),
        },
    }
}
