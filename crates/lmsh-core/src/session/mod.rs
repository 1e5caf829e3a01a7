//! Simulated session: state machine, menus, and credential table.

pub mod auth;
pub mod machine;
pub mod menu;

pub use auth::{CREDENTIALS, Credential, Role, authenticate};
pub use machine::{Effect, SessionMachine, SessionState};
