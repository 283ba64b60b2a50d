//! The overlay-supplied message id function.
//!
//! Computing a message id can require hashing a large payload, so the
//! function is modeled as async; it is the only suspension point in the
//! engine's ingest hooks (see the crate-level concurrency notes). A failure
//! here is surfaced to the caller of the affected hook and mutates no
//! engine state.

use async_trait::async_trait;

use crate::error::MessageIdError;
use crate::message::{MessageId, RawMessage};

#[async_trait]
pub trait MessageIdProvider: Send + Sync {
    async fn message_id(&self, msg: &RawMessage) -> Result<MessageId, MessageIdError>;
}

/// A message id function that hashes nothing and can't fail: it derives the
/// id directly from `received_from` and the message's topics. Collision-
/// prone (two distinct messages from the same peer on the same topics
/// alias), so this exists for deterministic tests only, not production use.
#[cfg(any(test, feature = "test-utils"))]
pub struct IdentityMessageIdProvider;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl MessageIdProvider for IdentityMessageIdProvider {
    async fn message_id(&self, msg: &RawMessage) -> Result<MessageId, MessageIdError> {
        let mut s = msg.received_from.as_str().to_string();
        for topic in &msg.topics {
            s.push('|');
            s.push_str(topic.as_str());
        }
        Ok(MessageId::from(s))
    }
}
