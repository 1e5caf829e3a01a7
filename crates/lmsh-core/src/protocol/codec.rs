//! JSON codec for wire messages.
//!
//! The transport is frame-delimited, so there is no length prefix; each
//! frame is one JSON object. Decoding failures are protocol violations and
//! never tear down the channel.

use crate::constants::MAX_FRAME_SIZE;
use crate::error::{Error, Result};

use super::Message;

/// Codec for JSON-encoded frames.
pub struct Codec;

impl Codec {
    /// Encode a message to a JSON frame.
    pub fn encode(msg: &Message) -> Result<String> {
        let text = serde_json::to_string(msg).map_err(|e| Error::Codec {
            message: format!("serialization failed: {e}"),
        })?;

        if text.len() > MAX_FRAME_SIZE {
            return Err(Error::Codec {
                message: format!(
                    "frame too large: {} bytes (max {})",
                    text.len(),
                    MAX_FRAME_SIZE
                ),
            });
        }

        Ok(text)
    }

    /// Decode a message from one received frame.
    pub fn decode(text: &str) -> Result<Message> {
        if text.len() > MAX_FRAME_SIZE {
            return Err(Error::Protocol {
                message: format!(
                    "frame too large: {} bytes (max {})",
                    text.len(),
                    MAX_FRAME_SIZE
                ),
            });
        }

        serde_json::from_str(text).map_err(|e| Error::Protocol {
            message: format!("malformed frame: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProgramStatus;

    #[test]
    fn encode_decode_roundtrip_output() {
        let msg = Message::Output {
            content: "\x1b[35mChoice: \x1b[0m".into(),
        };
        let encoded = Codec::encode(&msg).unwrap();
        assert_eq!(Codec::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn encode_decode_roundtrip_interrupt() {
        let msg = Message::Interrupt;
        let encoded = Codec::encode(&msg).unwrap();
        assert_eq!(Codec::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn decode_host_fixture() {
        let msg = Codec::decode(r#"{"type":"status","status":"started"}"#).unwrap();
        assert_eq!(
            msg,
            Message::Status {
                status: ProgramStatus::Started
            }
        );
    }

    #[test]
    fn decode_unknown_type_is_protocol_error() {
        let err = Codec::decode(r#"{"type":"resize","cols":80}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn decode_missing_field_is_protocol_error() {
        let err = Codec::decode(r#"{"type":"output"}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn decode_non_json_is_protocol_error() {
        let err = Codec::decode("not json at all").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn decode_oversized_frame_is_protocol_error() {
        let huge = "x".repeat(MAX_FRAME_SIZE + 1);
        let err = Codec::decode(&huge).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn encode_oversized_frame_is_codec_error() {
        let msg = Message::Output {
            content: "y".repeat(MAX_FRAME_SIZE),
        };
        let err = Codec::encode(&msg).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }
}
