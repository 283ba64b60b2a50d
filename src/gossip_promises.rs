//! Tracks IWANT follow-up expectations: a peer that advertised a message id
//! via IHAVE and was sent an IWANT for it is expected to deliver the
//! message before its promise expires. Breaking a promise is fed back to
//! the peer-score engine as a behaviour penalty.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fnv::FnvHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::message::{MessageId, RejectReason};
use crate::time::Clock;
use crate::topic::PeerId;

/// Per-message-id map of peer -> promise expiry.
#[derive(Default)]
struct MessagePromises(FnvHashMap<PeerId, Instant>);

pub struct GossipPromises {
    clock: Arc<dyn Clock>,
    followup_time: Duration,
    rng: ChaCha8Rng,
    promises: FnvHashMap<MessageId, MessagePromises>,
}

impl GossipPromises {
    pub fn new(clock: Arc<dyn Clock>, followup_time: Duration) -> Self {
        GossipPromises {
            clock,
            followup_time,
            rng: ChaCha8Rng::from_entropy(),
            promises: FnvHashMap::default(),
        }
    }

    /// Seeds the promise tracker's PRNG for reproducible tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_seed(clock: Arc<dyn Clock>, followup_time: Duration, seed: u64) -> Self {
        GossipPromises {
            clock,
            followup_time,
            rng: ChaCha8Rng::seed_from_u64(seed),
            promises: FnvHashMap::default(),
        }
    }

    /// True if we are already tracking a promise for `id` from any peer.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.promises.contains_key(id)
    }

    /// Chooses one message id uniformly at random from `msg_ids` and, if we
    /// aren't already tracking a promise for it from `peer`, starts one.
    /// Tracking a single random id (rather than every id in the IWANT)
    /// keeps memory proportional to the number of IWANTs sent, not the
    /// number of message ids requested.
    pub fn add_promise(&mut self, peer: PeerId, msg_ids: &[MessageId]) {
        if msg_ids.is_empty() {
            return;
        }
        let idx = self.rng.gen_range(0..msg_ids.len());
        let chosen = &msg_ids[idx];

        let entry = self.promises.entry(chosen.clone()).or_default();
        entry.0.entry(peer).or_insert_with(|| self.clock.now() + self.followup_time);
    }

    /// Scans all outstanding promises, counts one broken promise per peer
    /// whose expiry has passed, and removes those entries.
    pub fn get_broken_promises(&mut self) -> FnvHashMap<PeerId, usize> {
        let now = self.clock.now();
        let mut broken: FnvHashMap<PeerId, usize> = FnvHashMap::default();

        self.promises.retain(|_msg_id, tracked| {
            tracked.0.retain(|peer, expire| {
                if *expire < now {
                    *broken.entry(peer.clone()).or_insert(0) += 1;
                    false
                } else {
                    true
                }
            });
            !tracked.0.is_empty()
        });

        broken
    }

    /// The message was delivered: all outstanding promises for it are
    /// fulfilled.
    pub fn deliver_message(&mut self, id: &MessageId) {
        self.promises.remove(id);
    }

    /// The message was rejected. Signature failures never relieve
    /// outstanding promises (the message id was never really trusted), so
    /// the peer is still held to its promise; any other rejection reason
    /// fulfills the promise like a delivery would.
    pub fn reject_message(&mut self, id: &MessageId, reason: &RejectReason) {
        if reason.is_signature_failure() {
            return;
        }
        self.promises.remove(id);
    }

    pub fn clear(&mut self) {
        self.promises.clear();
    }
}
