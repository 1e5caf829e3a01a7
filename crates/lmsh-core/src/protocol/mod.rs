//! Wire protocol for the session host link.
//!
//! Each transport frame carries exactly one JSON-encoded message. `Output`
//! and `Status` flow host to client; `Command` and `Interrupt` flow client
//! to host.

mod codec;

pub use codec::Codec;

use serde::{Deserialize, Serialize};

/// Remote program run state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Started,
    Exited,
}

/// Top-level protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Raw text for the display surface. May contain styling escape
    /// sequences; never parsed or interpreted by the client.
    Output { content: String },
    /// Remote program lifecycle notification.
    Status { status: ProgramStatus },
    /// A command line for the session program.
    Command { command: String },
    /// Interrupt the running program.
    Interrupt,
}

impl Message {
    /// True for the message kinds a host may send to a client.
    pub fn is_host_to_client(&self) -> bool {
        matches!(self, Message::Output { .. } | Message::Status { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_wire_shape() {
        let msg = Message::Output {
            content: "hello".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"output","content":"hello"}"#);
    }

    #[test]
    fn status_wire_shape() {
        let started = Message::Status {
            status: ProgramStatus::Started,
        };
        assert_eq!(
            serde_json::to_string(&started).unwrap(),
            r#"{"type":"status","status":"started"}"#
        );

        let exited = Message::Status {
            status: ProgramStatus::Exited,
        };
        assert_eq!(
            serde_json::to_string(&exited).unwrap(),
            r#"{"type":"status","status":"exited"}"#
        );
    }

    #[test]
    fn command_wire_shape() {
        let msg = Message::Command {
            command: "./library_system".into(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"command","command":"./library_system"}"#
        );
    }

    #[test]
    fn interrupt_wire_shape() {
        let msg = Message::Interrupt;
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"type":"interrupt"}"#);
    }

    #[test]
    fn directionality() {
        assert!(
            Message::Output {
                content: String::new()
            }
            .is_host_to_client()
        );
        assert!(
            Message::Status {
                status: ProgramStatus::Exited
            }
            .is_host_to_client()
        );
        assert!(
            !Message::Command {
                command: String::new()
            }
            .is_host_to_client()
        );
        assert!(!Message::Interrupt.is_host_to_client());
    }
}
