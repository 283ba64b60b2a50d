//! Message-shaped types the engine is fed by the overlay.

use bytes::Bytes;
use std::fmt;

use crate::topic::{PeerId, TopicHash};

/// A message id, as computed by the overlay's `MessageIdFunction`. The core
/// never inspects these bytes beyond equality and hashing.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MessageId(Bytes);

impl MessageId {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        MessageId(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId::new(Bytes::from(s.into_bytes()))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId(0x")?;
        for byte in self.0.iter().take(8) {
            write!(f, "{byte:02x}")?;
        }
        if self.0.len() > 8 {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}

/// A message as received from a remote peer, scoped to what the scoring core
/// needs: who sent it to us and which scored topics it belongs to. Payload
/// inspection, signature verification, and decoding are the overlay's job.
#[derive(Clone, Debug)]
pub struct RawMessage {
    pub received_from: PeerId,
    pub topics: Vec<TopicHash>,
}

impl RawMessage {
    pub fn new(received_from: PeerId, topics: Vec<TopicHash>) -> Self {
        RawMessage {
            received_from,
            topics,
        }
    }
}

/// Bit-exact rejection reason codes consumed by the core, per the wire-level
/// validator. Any value other than the four named codes is treated as a
/// generic invalid-message rejection.
pub mod reason_codes {
    pub const ERR_MISSING_SIGNATURE: &str = "ERR_MISSING_SIGNATURE";
    pub const ERR_INVALID_SIGNATURE: &str = "ERR_INVALID_SIGNATURE";
    pub const ERR_TOPIC_VALIDATOR_IGNORE: &str = "ERR_TOPIC_VALIDATOR_IGNORE";
    pub const ERR_TOPIC_VALIDATOR_REJECT: &str = "ERR_TOPIC_VALIDATOR_REJECT";
}

/// The reason a message was rejected, classified from the wire-level reason
/// code. See [`reason_codes`] for the exact strings the overlay is expected
/// to use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The message carried no signature where one was required.
    MissingSignature,
    /// The message's signature did not verify.
    InvalidSignature,
    /// The topic validator explicitly asked us to ignore (not penalize) the
    /// message.
    ValidationIgnored,
    /// The message failed validation for any other reason (including the
    /// canonical `ERR_TOPIC_VALIDATOR_REJECT` and any unrecognized code).
    Invalid,
}

impl RejectReason {
    /// True for reasons where we never trusted the message id enough to
    /// create or mutate a delivery record.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            RejectReason::MissingSignature | RejectReason::InvalidSignature
        )
    }
}

impl From<&str> for RejectReason {
    fn from(code: &str) -> Self {
        match code {
            reason_codes::ERR_MISSING_SIGNATURE => RejectReason::MissingSignature,
            reason_codes::ERR_INVALID_SIGNATURE => RejectReason::InvalidSignature,
            reason_codes::ERR_TOPIC_VALIDATOR_IGNORE => RejectReason::ValidationIgnored,
            _ => RejectReason::Invalid,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            RejectReason::MissingSignature => reason_codes::ERR_MISSING_SIGNATURE,
            RejectReason::InvalidSignature => reason_codes::ERR_INVALID_SIGNATURE,
            RejectReason::ValidationIgnored => reason_codes::ERR_TOPIC_VALIDATOR_IGNORE,
            RejectReason::Invalid => reason_codes::ERR_TOPIC_VALIDATOR_REJECT,
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_reason_codes_are_generic_invalid() {
        assert_eq!(RejectReason::from("anything-else"), RejectReason::Invalid);
        assert_eq!(
            RejectReason::from(reason_codes::ERR_TOPIC_VALIDATOR_REJECT),
            RejectReason::Invalid
        );
    }

    #[test]
    fn signature_failures_are_classified() {
        assert!(RejectReason::MissingSignature.is_signature_failure());
        assert!(RejectReason::InvalidSignature.is_signature_failure());
        assert!(!RejectReason::ValidationIgnored.is_signature_failure());
        assert!(!RejectReason::Invalid.is_signature_failure());
    }
}
