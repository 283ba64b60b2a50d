//! Lightweight peer and topic identifiers.
//!
//! The scoring core is deliberately decoupled from any particular transport
//! or identity crate (wire protocol encoding and transport security are out
//! of scope, see the crate-level docs) — peer ids and topic hashes are
//! opaque, cheaply-cloneable strings supplied by the overlay.

use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a remote peer, as assigned by the overlay.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Arc<str>);

impl PeerId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        PeerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        PeerId::new(s)
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        PeerId::new(Arc::<str>::from(s))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

/// A topic name as scored by the engine. Matches the overlay's notion of a
/// "topic hash" (whatever normalization, if any, the overlay performs before
/// handing it to us) but carries no encoding of its own.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicHash(Arc<str>);

impl TopicHash {
    pub fn new(topic: impl Into<Arc<str>>) -> Self {
        TopicHash(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicHash {
    fn from(s: &str) -> Self {
        TopicHash::new(s)
    }
}

impl From<String> for TopicHash {
    fn from(s: String) -> Self {
        TopicHash::new(Arc::<str>::from(s))
    }
}

impl fmt::Display for TopicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TopicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicHash({})", self.0)
    }
}
