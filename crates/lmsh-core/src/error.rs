//! Error types for lmsh-core.

use thiserror::Error;

/// Main error type for lmsh operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A received message does not match the wire schema.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Codec error while encoding an outbound frame.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Transport layer error.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Connection was closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Operation timed out.
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Returns true if this error is transient and retrying may help.
    ///
    /// All transport-flavored failures are treated as transient; the manager
    /// resolves them into a scheduled retry or fallback activation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::ConnectionClosed | Error::Timeout | Error::Io(_)
        )
    }
}

/// Convenience result type for lmsh operations.
pub type Result<T> = std::result::Result<T, Error>;
