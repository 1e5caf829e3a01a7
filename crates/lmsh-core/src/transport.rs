//! Transport abstractions for the session host link.
//!
//! The client holds at most one logical channel at a time. Implementations
//! provide typed message framing over whatever byte transport they wrap.

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::Message;

/// Factory for channels to the session host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new channel, performing any handshake the transport needs.
    async fn connect(&self) -> Result<Box<dyn Channel>>;
}

/// An established bidirectional message channel.
#[async_trait]
pub trait Channel: Send {
    /// Transmit one message.
    async fn send(&mut self, msg: &Message) -> Result<()>;

    /// Receive the next message.
    ///
    /// Returns `Error::ConnectionClosed` when the peer goes away. A
    /// `Protocol` error covers a single malformed frame; the channel remains
    /// usable afterwards.
    async fn recv(&mut self) -> Result<Message>;

    /// Close the channel gracefully.
    async fn close(&mut self);
}
