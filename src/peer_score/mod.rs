//! Per-peer and per-topic scoring state, ingest hooks from the overlay, and
//! the periodic decay/IP-refresh background task.
//!
//! [`PeerScore`] is the synchronous scoring state machine described in the
//! component design; it holds no lock of its own. [`PeerScoreEngine`] is the
//! `Send + Sync` public entry point: it owns a `PeerScore` behind a mutex,
//! drives the background ticker, and is what the overlay actually talks to.

mod delivery;
mod params;

pub use delivery::{DeliveryRecord, DeliveryRecords, DeliveryStatus, DEFAULT_TIME_CACHE_DURATION};
pub use params::{PeerScoreParams, TopicScoreParams};

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::connection::ConnectionManager;
use crate::error::MessageIdError;
use crate::message::{RawMessage, RejectReason};
use crate::message_id::MessageIdProvider;
use crate::time::{Clock, SystemClock};
use crate::topic::{PeerId, TopicHash};

/// Connection status of a peer: while disconnected, `expire` says when the
/// peer's (retained, non-positive) score state should be dropped.
enum ConnectionStatus {
    Connected,
    Disconnected { expire: Instant },
}

/// A peer's inclusion in the mesh for a given topic.
enum MeshStatus {
    Active {
        graft_time: Instant,
        mesh_time: Duration,
    },
    Inactive,
}

impl MeshStatus {
    fn new_active(now: Instant) -> Self {
        MeshStatus::Active {
            graft_time: now,
            mesh_time: Duration::from_secs(0),
        }
    }
}

/// Scoring counters for a single (peer, topic) pair.
struct TopicStats {
    mesh_status: MeshStatus,
    first_message_deliveries: f64,
    mesh_message_deliveries_active: bool,
    mesh_message_deliveries: f64,
    mesh_failure_penalty: f64,
    invalid_message_deliveries: f64,
}

impl Default for TopicStats {
    fn default() -> Self {
        TopicStats {
            mesh_status: MeshStatus::Inactive,
            first_message_deliveries: 0.0,
            mesh_message_deliveries_active: false,
            mesh_message_deliveries: 0.0,
            mesh_failure_penalty: 0.0,
            invalid_message_deliveries: 0.0,
        }
    }
}

impl TopicStats {
    fn in_mesh(&self) -> bool {
        matches!(self.mesh_status, MeshStatus::Active { .. })
    }
}

/// Per-peer scoring state.
struct PeerStats {
    status: ConnectionStatus,
    topics: HashMap<TopicHash, TopicStats>,
    ips: Vec<IpAddr>,
    behaviour_penalty: f64,
}

impl PeerStats {
    fn new_connected() -> Self {
        PeerStats {
            status: ConnectionStatus::Connected,
            topics: HashMap::new(),
            ips: Vec::new(),
            behaviour_penalty: 0.0,
        }
    }

    /// Returns the topic stats for `topic`, creating default stats if the
    /// topic is scored and none exist yet. Returns `None` if the topic is
    /// not one we score.
    fn topic_stats_mut(
        &mut self,
        topic: &TopicHash,
        params: &PeerScoreParams,
    ) -> Option<&mut TopicStats> {
        if params.topics.contains_key(topic) {
            Some(self.topics.entry(topic.clone()).or_default())
        } else {
            self.topics.get_mut(topic)
        }
    }
}

/// The synchronous peer-scoring state machine. Not `Sync` on its own —
/// [`PeerScoreEngine`] wraps it behind a mutex for concurrent access.
pub struct PeerScore {
    clock: Arc<dyn Clock>,
    params: PeerScoreParams,
    peer_stats: FnvHashMap<PeerId, PeerStats>,
    peer_ips: FnvHashMap<IpAddr, FnvHashSet<PeerId>>,
    deliveries: DeliveryRecords,
}

impl PeerScore {
    pub fn new(params: PeerScoreParams, clock: Arc<dyn Clock>) -> Self {
        let deliveries = DeliveryRecords::new(clock.clone(), DEFAULT_TIME_CACHE_DURATION);
        PeerScore {
            clock,
            params,
            peer_stats: FnvHashMap::default(),
            peer_ips: FnvHashMap::default(),
            deliveries,
        }
    }

    /// The current score for `peer`. Unknown peers score 0.
    pub fn score(&self, peer_id: &PeerId) -> f64 {
        let peer_stats = match self.peer_stats.get(peer_id) {
            Some(v) => v,
            None => return 0.0,
        };

        let mut score = 0.0;

        for (topic, topic_stats) in peer_stats.topics.iter() {
            let topic_params = match self.params.topics.get(topic) {
                Some(p) => p,
                None => continue,
            };

            let mut topic_score = 0.0;

            // P1: time in mesh
            if let MeshStatus::Active { mesh_time, .. } = topic_stats.mesh_status {
                let p1 = (mesh_time.as_secs_f64() / topic_params.time_in_mesh_quantum.as_secs_f64())
                    .min(topic_params.time_in_mesh_cap);
                topic_score += p1 * topic_params.time_in_mesh_weight;
            }

            // P2: first message deliveries
            let p2 = topic_stats.first_message_deliveries;
            topic_score += p2 * topic_params.first_message_deliveries_weight;

            // P3: mesh message delivery rate failures
            if topic_stats.mesh_message_deliveries_active
                && topic_stats.mesh_message_deliveries < topic_params.mesh_message_deliveries_threshold
            {
                let deficit =
                    topic_params.mesh_message_deliveries_threshold - topic_stats.mesh_message_deliveries;
                topic_score += deficit * deficit * topic_params.mesh_message_deliveries_weight;
            }

            // P3b: sticky mesh failure penalty (negative weight validated at construction)
            topic_score += topic_stats.mesh_failure_penalty * topic_params.mesh_failure_penalty_weight;

            // P4: invalid messages (negative weight validated at construction)
            let p4 = topic_stats.invalid_message_deliveries * topic_stats.invalid_message_deliveries;
            topic_score += p4 * topic_params.invalid_message_deliveries_weight;

            score += topic_score * topic_params.topic_weight;
        }

        // topic score cap: clamp the cross-topic accumulated score once,
        // after summing every topic's contribution
        if self.params.topic_score_cap > 0.0 && score > self.params.topic_score_cap {
            score = self.params.topic_score_cap;
        }

        // P5: application-specific score
        let p5 = (self.params.app_specific_score)(peer_id);
        score += p5 * self.params.app_specific_weight;

        // P6: IP colocation factor
        for ip in peer_stats.ips.iter() {
            if self.params.ip_colocation_factor_whitelist.contains(ip) {
                continue;
            }
            if let Some(peers_on_ip) = self.peer_ips.get(ip).map(|peers| peers.len()) {
                let n = peers_on_ip as f64;
                if n > self.params.ip_colocation_factor_threshold {
                    let surplus = n - self.params.ip_colocation_factor_threshold;
                    score += surplus * surplus * self.params.ip_colocation_factor_weight;
                }
            }
        }

        // P7: behaviour penalty
        let excess = (peer_stats.behaviour_penalty - self.params.behaviour_penalty_threshold).max(0.0);
        score += excess * excess * self.params.behaviour_penalty_weight;

        score
    }

    pub fn add_peer(&mut self, peer_id: PeerId, ips: Vec<IpAddr>) {
        debug!("adding scoring state for peer {peer_id}");
        let previous_ips = self
            .peer_stats
            .get(&peer_id)
            .map(|p| p.ips.clone())
            .unwrap_or_default();

        for ip in &previous_ips {
            if !ips.contains(ip) {
                if let Some(peers) = self.peer_ips.get_mut(ip) {
                    peers.remove(&peer_id);
                    if peers.is_empty() {
                        self.peer_ips.remove(ip);
                    }
                }
            }
        }
        for ip in &ips {
            if !previous_ips.contains(ip) {
                self.peer_ips.entry(*ip).or_default().insert(peer_id.clone());
            }
        }

        let entry = self
            .peer_stats
            .entry(peer_id.clone())
            .or_insert_with(PeerStats::new_connected);
        entry.status = ConnectionStatus::Connected;
        entry.ips = ips;
    }

    /// Removes a peer from the score table, retaining its (non-positive)
    /// state for `retain_score` if its current score is not positive — a
    /// misbehaving peer can't reset its score by simply disconnecting.
    pub fn remove_peer(&mut self, peer_id: &PeerId) {
        if self.score(peer_id) > 0.0 {
            if let Some(stats) = self.peer_stats.remove(peer_id) {
                self.remove_ips_from_index(peer_id, &stats.ips);
            }
            return;
        }

        let now = self.clock.now();
        let retain_score = self.params.retain_score;
        let topics = self.params.topics.clone_keys_with_threshold();
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            for (topic, topic_stats) in peer_stats.topics.iter_mut() {
                topic_stats.first_message_deliveries = 0.0;

                if let Some(threshold) = topics.get(topic) {
                    if topic_stats.in_mesh()
                        && topic_stats.mesh_message_deliveries_active
                        && topic_stats.mesh_message_deliveries < *threshold
                    {
                        let deficit = *threshold - topic_stats.mesh_message_deliveries;
                        topic_stats.mesh_failure_penalty += deficit * deficit;
                    }
                }
                topic_stats.mesh_status = MeshStatus::Inactive;
            }

            peer_stats.status = ConnectionStatus::Disconnected {
                expire: now + retain_score,
            };
        }
    }

    pub fn graft(&mut self, peer_id: &PeerId, topic: TopicHash) {
        let now = self.clock.now();
        let params = &self.params;
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            if let Some(topic_stats) = peer_stats.topic_stats_mut(&topic, params) {
                topic_stats.mesh_status = MeshStatus::new_active(now);
                topic_stats.mesh_message_deliveries_active = false;
            }
        }
    }

    pub fn prune(&mut self, peer_id: &PeerId, topic: TopicHash) {
        let threshold = self
            .params
            .topics
            .get(&topic)
            .map(|p| p.mesh_message_deliveries_threshold);
        let params = &self.params;
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            if let Some(topic_stats) = peer_stats.topic_stats_mut(&topic, params) {
                if let Some(threshold) = threshold {
                    if topic_stats.mesh_message_deliveries_active
                        && topic_stats.mesh_message_deliveries < threshold
                    {
                        let deficit = threshold - topic_stats.mesh_message_deliveries;
                        topic_stats.mesh_failure_penalty += deficit * deficit;
                    }
                }
                topic_stats.mesh_message_deliveries_active = false;
                topic_stats.mesh_status = MeshStatus::Inactive;
            }
        }
    }

    pub fn add_penalty(&mut self, peer_id: &PeerId, amount: f64) {
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            peer_stats.behaviour_penalty += amount;
        }
    }

    /// Pure notification: ensures a delivery record exists so later
    /// Deliver/Reject/Duplicate calls have something to reason about.
    pub fn validate_message(&mut self, msg_id: &crate::message::MessageId) {
        self.deliveries.ensure(msg_id);
    }

    pub fn deliver_message(&mut self, msg_id: &crate::message::MessageId, msg: &RawMessage) {
        self.mark_first_message_delivery(&msg.received_from, msg);

        let now = self.clock.now();
        let record = self.deliveries.ensure(msg_id);
        if record.status != DeliveryStatus::Unknown {
            warn!(
                "unexpected delivery trace: message {:?} from {} was first seen {:?} ago with status {:?}",
                msg_id,
                msg.received_from,
                now.saturating_duration_since(record.first_seen),
                record.status
            );
            return;
        }

        record.status = DeliveryStatus::Valid;
        record.validated = Some(now);
        let earlier_forwarders: Vec<PeerId> = record.peers.iter().cloned().collect();

        for peer in earlier_forwarders {
            if peer != msg.received_from {
                self.mark_duplicate_message_delivery(&peer, msg, Some(now));
            }
        }
    }

    pub fn reject_message(
        &mut self,
        msg_id: &crate::message::MessageId,
        msg: &RawMessage,
        reason: RejectReason,
    ) {
        if reason.is_signature_failure() {
            self.mark_invalid_message_delivery(&msg.received_from, msg);
            return;
        }

        let record = self.deliveries.ensure(msg_id);
        if record.status != DeliveryStatus::Unknown {
            warn!(
                "unexpected delivery trace: message {:?} from {} already had status {:?}",
                msg_id, msg.received_from, record.status
            );
            return;
        }

        if reason == RejectReason::ValidationIgnored {
            record.status = DeliveryStatus::Ignored;
            return;
        }

        record.status = DeliveryStatus::Invalid;
        let earlier_forwarders: Vec<PeerId> = record.peers.iter().cloned().collect();

        self.mark_invalid_message_delivery(&msg.received_from, msg);
        for peer in earlier_forwarders {
            self.mark_invalid_message_delivery(&peer, msg);
        }
    }

    pub fn duplicate_message(&mut self, msg_id: &crate::message::MessageId, msg: &RawMessage) {
        let from = msg.received_from.clone();
        let now = self.clock.now();

        let status = {
            let record = self.deliveries.ensure(msg_id);
            if record.peers.contains(&from) {
                return;
            }
            record.status
        };

        match status {
            DeliveryStatus::Unknown => {
                self.deliveries.ensure(msg_id).peers.insert(from);
            }
            DeliveryStatus::Valid => {
                self.deliveries.ensure(msg_id).peers.insert(from.clone());
                let validated = self.deliveries.get(msg_id).and_then(|r| r.validated);
                self.mark_duplicate_message_delivery(&from, msg, validated.or(Some(now)));
            }
            DeliveryStatus::Invalid => {
                self.mark_invalid_message_delivery(&from, msg);
            }
            DeliveryStatus::Ignored => {}
        }
    }

    fn mark_first_message_delivery(&mut self, peer_id: &PeerId, msg: &RawMessage) {
        let params = &self.params;
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            for topic in &msg.topics {
                let topic_params = match params.topics.get(topic) {
                    Some(p) => p,
                    None => continue,
                };
                if let Some(topic_stats) = peer_stats.topic_stats_mut(topic, params) {
                    topic_stats.first_message_deliveries = (topic_stats.first_message_deliveries + 1.0)
                        .min(topic_params.first_message_deliveries_cap);

                    if topic_stats.in_mesh() {
                        topic_stats.mesh_message_deliveries = (topic_stats.mesh_message_deliveries + 1.0)
                            .min(topic_params.mesh_message_deliveries_cap);
                    }
                }
            }
        }
    }

    /// `validated_time`: `None` if the message was delivered before we
    /// finished validating it (always within the mesh-delivery window, per
    /// the redesign flag on the upstream sentinel-timestamp branch); `Some`
    /// otherwise, compared against the topic's delivery window.
    fn mark_duplicate_message_delivery(
        &mut self,
        peer_id: &PeerId,
        msg: &RawMessage,
        validated_time: Option<Instant>,
    ) {
        let now = self.clock.now();
        let params = &self.params;
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            for topic in &msg.topics {
                let topic_params = match params.topics.get(topic) {
                    Some(p) => p,
                    None => continue,
                };
                if let Some(topic_stats) = peer_stats.topic_stats_mut(topic, params) {
                    if !topic_stats.in_mesh() {
                        continue;
                    }
                    if let Some(validated) = validated_time {
                        if now > validated + topic_params.mesh_message_deliveries_window {
                            continue;
                        }
                    }
                    topic_stats.mesh_message_deliveries = (topic_stats.mesh_message_deliveries + 1.0)
                        .min(topic_params.mesh_message_deliveries_cap);
                }
            }
        }
    }

    fn mark_invalid_message_delivery(&mut self, peer_id: &PeerId, msg: &RawMessage) {
        let params = &self.params;
        if let Some(peer_stats) = self.peer_stats.get_mut(peer_id) {
            for topic in &msg.topics {
                if let Some(topic_stats) = peer_stats.topic_stats_mut(topic, params) {
                    topic_stats.invalid_message_deliveries += 1.0;
                }
            }
        }
    }

    fn remove_ips_from_index(&mut self, peer_id: &PeerId, ips: &[IpAddr]) {
        for ip in ips {
            if let Some(peers) = self.peer_ips.get_mut(ip) {
                peers.remove(peer_id);
                if peers.is_empty() {
                    self.peer_ips.remove(ip);
                }
            }
        }
    }

    /// Decays all counters, retires expired disconnected peers, and
    /// activates mesh-message-delivery scoring for peers that have been
    /// grafted long enough.
    pub fn refresh_scores(&mut self) {
        let now = self.clock.now();
        let params = &self.params;
        let mut to_drop = Vec::new();

        for (peer_id, peer_stats) in self.peer_stats.iter_mut() {
            if let ConnectionStatus::Disconnected { expire } = &peer_stats.status {
                if now > *expire {
                    to_drop.push((peer_id.clone(), peer_stats.ips.clone()));
                }
                // disconnected peers are never decayed: otherwise a
                // misbehaving peer could bleed off penalties just by
                // dropping the connection.
                continue;
            }

            for (topic, topic_stats) in peer_stats.topics.iter_mut() {
                let topic_params = match params.topics.get(topic) {
                    Some(p) => p,
                    None => continue,
                };

                topic_stats.first_message_deliveries *= topic_params.first_message_deliveries_decay;
                if topic_stats.first_message_deliveries < params.decay_to_zero {
                    topic_stats.first_message_deliveries = 0.0;
                }

                topic_stats.mesh_message_deliveries *= topic_params.mesh_message_deliveries_decay;
                if topic_stats.mesh_message_deliveries < params.decay_to_zero {
                    topic_stats.mesh_message_deliveries = 0.0;
                }

                topic_stats.mesh_failure_penalty *= topic_params.mesh_failure_penalty_decay;
                if topic_stats.mesh_failure_penalty < params.decay_to_zero {
                    topic_stats.mesh_failure_penalty = 0.0;
                }

                topic_stats.invalid_message_deliveries *= topic_params.invalid_message_deliveries_decay;
                if topic_stats.invalid_message_deliveries < params.decay_to_zero {
                    topic_stats.invalid_message_deliveries = 0.0;
                }

                if let MeshStatus::Active {
                    graft_time,
                    mesh_time,
                } = &mut topic_stats.mesh_status
                {
                    *mesh_time = now.saturating_duration_since(*graft_time);
                    if *mesh_time > topic_params.mesh_message_deliveries_activation {
                        topic_stats.mesh_message_deliveries_active = true;
                    }
                }
            }

            peer_stats.behaviour_penalty *= params.behaviour_penalty_decay;
            if peer_stats.behaviour_penalty < params.decay_to_zero {
                peer_stats.behaviour_penalty = 0.0;
            }
        }

        for (peer_id, ips) in to_drop {
            self.peer_stats.remove(&peer_id);
            self.remove_ips_from_index(&peer_id, &ips);
        }
    }

    /// Reconciles each known peer's IP list against the connection manager,
    /// adding and removing entries from the `peer_ips` index as needed.
    pub fn update_ips(&mut self, connections: &dyn ConnectionManager) {
        let peer_ids: Vec<PeerId> = self.peer_stats.keys().cloned().collect();
        for peer_id in peer_ids {
            let current = connections.connections(&peer_id);
            let previous = self
                .peer_stats
                .get(&peer_id)
                .map(|p| p.ips.clone())
                .unwrap_or_default();

            for ip in previous.iter() {
                if !current.contains(ip) {
                    if let Some(peers) = self.peer_ips.get_mut(ip) {
                        peers.remove(&peer_id);
                        if peers.is_empty() {
                            self.peer_ips.remove(ip);
                        }
                    }
                }
            }
            for ip in current.iter() {
                if !previous.contains(ip) {
                    self.peer_ips.entry(*ip).or_default().insert(peer_id.clone());
                }
            }

            if let Some(peer_stats) = self.peer_stats.get_mut(&peer_id) {
                peer_stats.ips = current;
            }
        }
    }

    pub fn gc_deliveries(&mut self) {
        self.deliveries.gc();
    }

    pub fn clear(&mut self) {
        self.peer_stats.clear();
        self.peer_ips.clear();
        self.deliveries.clear();
    }
}

/// Small helper so `remove_peer` can look up a topic's
/// `mesh_message_deliveries_threshold` without holding a borrow of
/// `self.params` across the peer-stats mutation below it.
trait TopicsExt {
    fn clone_keys_with_threshold(&self) -> FnvHashMap<TopicHash, f64>;
}

impl TopicsExt for HashMap<TopicHash, TopicScoreParams> {
    fn clone_keys_with_threshold(&self) -> FnvHashMap<TopicHash, f64> {
        self.iter()
            .map(|(topic, params)| (topic.clone(), params.mesh_message_deliveries_threshold))
            .collect()
    }
}

/// The engine's `Send + Sync` public entry point. Owns the scoring state
/// behind a mutex and the background decay/IP-refresh ticker.
pub struct PeerScoreEngine {
    inner: Arc<Mutex<PeerScore>>,
    connection_manager: Arc<dyn ConnectionManager>,
    message_id_provider: Arc<dyn MessageIdProvider>,
    decay_interval: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl PeerScoreEngine {
    pub fn new(
        params: PeerScoreParams,
        connection_manager: Arc<dyn ConnectionManager>,
        message_id_provider: Arc<dyn MessageIdProvider>,
    ) -> Self {
        Self::with_clock(
            params,
            connection_manager,
            message_id_provider,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        params: PeerScoreParams,
        connection_manager: Arc<dyn ConnectionManager>,
        message_id_provider: Arc<dyn MessageIdProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let decay_interval = params.decay_interval;
        PeerScoreEngine {
            inner: Arc::new(Mutex::new(PeerScore::new(params, clock))),
            connection_manager,
            message_id_provider,
            decay_interval,
            ticker: Mutex::new(None),
        }
    }

    /// Starts the background decay/IP-refresh/GC ticker. A second call
    /// while already started replaces the previous ticker task.
    pub fn start(&self) {
        let inner = self.inner.clone();
        let connection_manager = self.connection_manager.clone();
        let decay_interval = self.decay_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(decay_interval);
            interval.tick().await; // the first tick fires immediately
            loop {
                interval.tick().await;
                let mut guard = inner.lock();
                guard.refresh_scores();
                guard.update_ips(connection_manager.as_ref());
                guard.gc_deliveries();
            }
        });

        let mut ticker = self.ticker.lock();
        if let Some(old) = ticker.replace(handle) {
            old.abort();
        }
    }

    /// Runs one round of decay + IP refresh + delivery GC synchronously,
    /// without waiting for the ticker interval. The background ticker in
    /// [`Self::start`] is driven by real wall-clock time, which deterministic
    /// tests built on [`crate::time::ManualClock`] can't fast-forward; this
    /// is the test-only escape hatch for exercising the same three steps.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn force_refresh(&self) {
        let mut guard = self.inner.lock();
        guard.refresh_scores();
        guard.update_ips(self.connection_manager.as_ref());
        guard.gc_deliveries();
    }

    /// Cancels the ticker and clears all in-memory state.
    pub fn stop(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
        }
        self.inner.lock().clear();
    }

    pub fn score(&self, peer_id: &PeerId) -> f64 {
        self.inner.lock().score(peer_id)
    }

    pub fn add_peer(&self, peer_id: PeerId) {
        let ips = self.connection_manager.connections(&peer_id);
        self.inner.lock().add_peer(peer_id, ips);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.lock().remove_peer(peer_id);
    }

    pub fn graft(&self, peer_id: &PeerId, topic: TopicHash) {
        self.inner.lock().graft(peer_id, topic);
    }

    pub fn prune(&self, peer_id: &PeerId, topic: TopicHash) {
        self.inner.lock().prune(peer_id, topic);
    }

    pub fn add_penalty(&self, peer_id: &PeerId, amount: f64) {
        self.inner.lock().add_penalty(peer_id, amount);
    }

    pub async fn validate_message(&self, msg: &RawMessage) -> Result<(), MessageIdError> {
        let msg_id = self.message_id_provider.message_id(msg).await?;
        self.inner.lock().validate_message(&msg_id);
        Ok(())
    }

    pub async fn deliver_message(&self, msg: &RawMessage) -> Result<(), MessageIdError> {
        let msg_id = self.message_id_provider.message_id(msg).await?;
        self.inner.lock().deliver_message(&msg_id, msg);
        Ok(())
    }

    pub async fn reject_message(
        &self,
        msg: &RawMessage,
        reason: RejectReason,
    ) -> Result<(), MessageIdError> {
        let msg_id = self.message_id_provider.message_id(msg).await?;
        self.inner.lock().reject_message(&msg_id, msg, reason);
        Ok(())
    }

    pub async fn duplicate_message(&self, msg: &RawMessage) -> Result<(), MessageIdError> {
        let msg_id = self.message_id_provider.message_id(msg).await?;
        self.inner.lock().duplicate_message(&msg_id, msg);
        Ok(())
    }
}

impl Drop for PeerScoreEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
        }
    }
}
