//! lmsh-client: client library for the lmsh terminal.
//!
//! Provides:
//! - CLI argument parsing
//! - Connection lifecycle management and the session event loop
//! - WebSocket transport to the session host
//! - Raw terminal mode handling and stdin bridging
//! - ANSI display and status collaborators
//! - Connection metrics

pub mod cli;
pub mod display;
pub mod input;
pub mod manager;
pub mod metrics;
pub mod ws;

pub use cli::{Cli, CliLogFormat};
pub use display::{StatusReporter, TermDisplay};
pub use input::{RawModeGuard, spawn_stdin_reader};
pub use manager::{
    ConnectionManager, ConnectionState, Event, ManagerConfig, ManagerHandle, UserAction,
};
pub use metrics::ConnectionMetrics;
pub use ws::WsTransport;
