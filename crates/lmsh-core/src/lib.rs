//! lmsh-core: shared library for the lmsh terminal client.
//!
//! This crate provides:
//! - Wire message definitions and the JSON frame codec
//! - The simulated session state machine and its menus
//! - The line-editing buffer shared by remote and local modes
//! - Transport and display collaborator traits
//! - Error types, constants, and logging setup

pub mod constants;
pub mod display;
pub mod error;
pub mod line;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
