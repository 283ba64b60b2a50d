//! Bounded map + FIFO expiry queue of per-message delivery state.
//!
//! This is the single source of truth that decides whether a
//! `duplicate_message` call reflects a peer who beat validation (counts
//! toward mesh delivery) or arrived too late, and it fans out penalties to
//! earlier forwarders when a message is rejected after duplicates were
//! recorded.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fnv::FnvHashMap;

use crate::message::MessageId;
use crate::time::Clock;
use crate::topic::PeerId;

/// The number of seconds delivery records are retained for by default (the
/// standard gossipsub seen-cache duration).
pub const DEFAULT_TIME_CACHE_DURATION: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Don't know (yet) if the message is valid.
    Unknown,
    /// The message is valid.
    Valid,
    /// The message is invalid.
    Invalid,
    /// The validator instructed us to ignore the message.
    Ignored,
}

#[derive(Debug)]
pub struct DeliveryRecord {
    pub status: DeliveryStatus,
    pub first_seen: Instant,
    /// Set once `status` transitions to `Valid`.
    pub validated: Option<Instant>,
    /// Peers that forwarded this message to us before it reached a terminal
    /// status.
    pub peers: HashSet<PeerId>,
    expire: Instant,
}

impl DeliveryRecord {
    fn new(now: Instant, expire: Instant) -> Self {
        DeliveryRecord {
            status: DeliveryStatus::Unknown,
            first_seen: now,
            validated: None,
            peers: HashSet::new(),
            expire,
        }
    }
}

/// Hash-indexed, insertion-ordered store of [`DeliveryRecord`]s.
pub struct DeliveryRecords {
    clock: Arc<dyn Clock>,
    retention: Duration,
    records: FnvHashMap<MessageId, DeliveryRecord>,
    /// FIFO queue of (id, expire), monotone in `first_seen` since every
    /// record is pushed exactly once, at creation, in `first_seen` order.
    fifo: VecDeque<(MessageId, Instant)>,
}

impl DeliveryRecords {
    pub fn new(clock: Arc<dyn Clock>, retention: Duration) -> Self {
        DeliveryRecords {
            clock,
            retention,
            records: FnvHashMap::default(),
            fifo: VecDeque::new(),
        }
    }

    /// Returns the existing record for `id`, or creates one in `Unknown`
    /// status and appends it to the FIFO queue.
    pub fn ensure(&mut self, id: &MessageId) -> &mut DeliveryRecord {
        if !self.records.contains_key(id) {
            let now = self.clock.now();
            let expire = now + self.retention;
            self.records.insert(id.clone(), DeliveryRecord::new(now, expire));
            self.fifo.push_back((id.clone(), expire));
        }
        self.records.get_mut(id).expect("just inserted or present")
    }

    pub fn get(&self, id: &MessageId) -> Option<&DeliveryRecord> {
        self.records.get(id)
    }

    /// Pops expired records from the front of the FIFO queue.
    pub fn gc(&mut self) {
        let now = self.clock.now();
        while let Some((_, expire)) = self.fifo.front() {
            if *expire > now {
                break;
            }
            let (id, _) = self.fifo.pop_front().expect("checked front above");
            self.records.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.fifo.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
