//! Test utilities for lmsh.
//!
//! Provides in-memory stand-ins for the external collaborators:
//! - `MockTransport`/`MockRemote` for driving the connection manager
//!   without a network
//! - `RecordingDisplay`/`RecordingStatus` for asserting on rendered output

pub mod mock_transport;
pub mod recording;

pub use mock_transport::{ConnectOutcome, MockChannel, MockRemote, MockTransport, mock_channel_pair};
pub use recording::{RecordingDisplay, RecordingStatus};
