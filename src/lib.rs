//! Peer-scoring core for a gossipsub-style publish/subscribe overlay.
//!
//! This crate implements three cooperating pieces an overlay's mesh
//! maintenance and IHAVE/IWANT machinery are expected to drive:
//!
//! - [`peer_score::PeerScoreEngine`]: per-peer, per-topic counters, their
//!   decay, the weighted score formula, and disconnect retention.
//! - [`peer_score::DeliveryRecords`] (internal to the engine): first-seen,
//!   validity, and duplicate-forwarder tracking for recently seen messages.
//! - [`gossip_promises::GossipPromises`]: IWANT follow-up tracking, fed
//!   independently by the overlay's IHAVE/IWANT path.
//!
//! Wire encoding, transport security, and mesh membership decisions
//! themselves are the overlay's job; this crate only turns ingest
//! notifications into a per-peer score.
//!
//! # Concurrency
//!
//! [`peer_score::PeerScoreEngine`] is `Send + Sync` and safe to share behind
//! an `Arc`. Its ingest hooks take a single internal lock; the only
//! suspension point before that lock is acquired is the overlay-supplied
//! [`message_id::MessageIdProvider`], so a slow message id computation for
//! one message never blocks unrelated score reads.
//!
//! # Time
//!
//! All decay and retention logic reads time through [`time::Clock`] rather
//! than calling `Instant::now()` directly, so tests can advance time
//! deterministically with [`time::ManualClock`] instead of sleeping.

pub mod connection;
pub mod error;
pub mod gossip_promises;
pub mod message;
pub mod message_id;
pub mod peer_score;
pub mod time;
pub mod topic;

pub use connection::{ConnectionManager, NoopConnectionManager};
pub use error::{MessageIdError, ScoreConfigError};
pub use gossip_promises::GossipPromises;
pub use message::{MessageId, RawMessage, RejectReason};
pub use message_id::MessageIdProvider;
pub use peer_score::{PeerScore, PeerScoreEngine, PeerScoreParams, TopicScoreParams};
pub use time::{Clock, SystemClock};
pub use topic::{PeerId, TopicHash};

#[cfg(any(test, feature = "test-utils"))]
pub use connection::StaticConnectionManager;
#[cfg(any(test, feature = "test-utils"))]
pub use message_id::IdentityMessageIdProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use time::ManualClock;
