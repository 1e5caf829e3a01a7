//! Mock transport for testing without a real network.
//!
//! Connect attempts follow a script (accept, refuse, or hang); each accepted
//! attempt hands the test a `MockRemote` playing the session host.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use lmsh_core::error::{Error, Result};
use lmsh_core::protocol::Message;
use lmsh_core::transport::{Channel, Transport};

/// Outcome of one scripted connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Succeed; the host side arrives on the remotes receiver.
    Accept,
    /// Fail immediately with a transport error.
    Refuse,
    /// Never complete. The attempt hangs until its task is dropped.
    Pend,
}

/// Scripted transport factory.
pub struct MockTransport {
    script: Mutex<VecDeque<ConnectOutcome>>,
    default: ConnectOutcome,
    attempts: AtomicU64,
    remotes: mpsc::UnboundedSender<MockRemote>,
}

impl MockTransport {
    /// Create a transport whose attempts follow `script`, then repeat
    /// `default` once the script is exhausted. Returns the receiver that
    /// yields one `MockRemote` per accepted attempt.
    pub fn scripted(
        script: impl IntoIterator<Item = ConnectOutcome>,
        default: ConnectOutcome,
    ) -> (std::sync::Arc<Self>, mpsc::UnboundedReceiver<MockRemote>) {
        let (remotes_tx, remotes_rx) = mpsc::unbounded_channel();
        let transport = std::sync::Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            default,
            attempts: AtomicU64::new(0),
            remotes: remotes_tx,
        });
        (transport, remotes_rx)
    }

    /// Create a transport that always produces `default`.
    pub fn always(
        default: ConnectOutcome,
    ) -> (std::sync::Arc<Self>, mpsc::UnboundedReceiver<MockRemote>) {
        Self::scripted([], default)
    }

    /// Number of connect attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<Box<dyn Channel>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default);

        match outcome {
            ConnectOutcome::Accept => {
                let (channel, remote) = mock_pair();
                // Tests that never look at the host side may drop the receiver.
                let _ = self.remotes.send(remote);
                Ok(Box::new(channel))
            }
            ConnectOutcome::Refuse => Err(Error::Transport {
                message: "connection refused".into(),
            }),
            ConnectOutcome::Pend => std::future::pending().await,
        }
    }
}

/// Client half of an in-memory connection.
pub struct MockChannel {
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    closed: bool,
}

#[async_trait]
impl Channel for MockChannel {
    async fn send(&mut self, msg: &Message) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        self.tx
            .send(msg.clone())
            .map_err(|_| Error::ConnectionClosed)
    }

    async fn recv(&mut self) -> Result<Message> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        self.rx.recv().await.ok_or(Error::ConnectionClosed)
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Host half of an in-memory connection.
///
/// Dropping it closes the connection from the host side.
pub struct MockRemote {
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl MockRemote {
    /// Send a message to the client. Returns false once the client is gone.
    pub fn send(&self, message: Message) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Wait for the next message from the client.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take a message from the client if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Close the connection from the host side.
    pub fn close(self) {}
}

fn mock_pair() -> (MockChannel, MockRemote) {
    let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();
    let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
    let channel = MockChannel {
        tx: to_host_tx,
        rx: to_client_rx,
        closed: false,
    };
    let remote = MockRemote {
        tx: to_client_tx,
        rx: to_host_rx,
    };
    (channel, remote)
}

/// Build a connected channel/remote pair directly, bypassing the transport.
pub fn mock_channel_pair() -> (Box<dyn Channel>, MockRemote) {
    let (channel, remote) = mock_pair();
    (Box::new(channel), remote)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_and_remote_exchange_messages() {
        let (mut channel, mut remote) = mock_channel_pair();

        channel.send(&Message::Interrupt).await.unwrap();
        assert_eq!(remote.recv().await, Some(Message::Interrupt));

        remote.send(Message::Output {
            content: "hi".into(),
        });
        assert_eq!(
            channel.recv().await.unwrap(),
            Message::Output {
                content: "hi".into()
            }
        );
    }

    #[tokio::test]
    async fn dropping_the_remote_closes_the_channel() {
        let (mut channel, remote) = mock_channel_pair();
        remote.close();
        assert!(matches!(
            channel.recv().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn closed_channel_rejects_io() {
        let (mut channel, _remote) = mock_channel_pair();
        channel.close().await;
        assert!(matches!(
            channel.send(&Message::Interrupt).await,
            Err(Error::ConnectionClosed)
        ));
        assert!(matches!(channel.recv().await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn script_runs_before_the_default() {
        let (transport, mut remotes) =
            MockTransport::scripted([ConnectOutcome::Accept], ConnectOutcome::Refuse);

        assert!(transport.connect().await.is_ok());
        assert!(remotes.recv().await.is_some());
        assert!(transport.connect().await.is_err());
        assert!(transport.connect().await.is_err());
        assert_eq!(transport.attempts(), 3);
    }
}
