//! Validated scoring configuration: global weights, per-topic weights,
//! decay interval, caps, thresholds, retention.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ScoreConfigError;
use crate::topic::{PeerId, TopicHash};

/// Per-topic scoring weights and decay/cap parameters.
#[derive(Clone, Debug)]
pub struct TopicScoreParams {
    pub topic_weight: f64,

    pub time_in_mesh_weight: f64,
    pub time_in_mesh_quantum: Duration,
    pub time_in_mesh_cap: f64,

    pub first_message_deliveries_weight: f64,
    pub first_message_deliveries_decay: f64,
    pub first_message_deliveries_cap: f64,

    pub mesh_message_deliveries_weight: f64,
    pub mesh_message_deliveries_decay: f64,
    pub mesh_message_deliveries_cap: f64,
    pub mesh_message_deliveries_threshold: f64,
    pub mesh_message_deliveries_window: Duration,
    pub mesh_message_deliveries_activation: Duration,

    pub mesh_failure_penalty_weight: f64,
    pub mesh_failure_penalty_decay: f64,

    pub invalid_message_deliveries_weight: f64,
    pub invalid_message_deliveries_decay: f64,
}

impl Default for TopicScoreParams {
    /// Mirrors the reference gossipsub constants: a topic that does not
    /// override these gets a time-in-mesh bonus and first-delivery credit
    /// but no mesh-delivery or invalid-delivery penalties (those need
    /// application-specific thresholds to be meaningful).
    fn default() -> Self {
        TopicScoreParams {
            topic_weight: 1.0,

            time_in_mesh_weight: 1.0,
            time_in_mesh_quantum: Duration::from_secs(1),
            time_in_mesh_cap: 3600.0,

            first_message_deliveries_weight: 1.0,
            first_message_deliveries_decay: 0.9,
            first_message_deliveries_cap: 2000.0,

            mesh_message_deliveries_weight: 0.0,
            mesh_message_deliveries_decay: 0.5,
            mesh_message_deliveries_cap: 100.0,
            mesh_message_deliveries_threshold: 1.0,
            mesh_message_deliveries_window: Duration::from_millis(10),
            mesh_message_deliveries_activation: Duration::from_secs(5),

            mesh_failure_penalty_weight: 0.0,
            mesh_failure_penalty_decay: 0.5,

            invalid_message_deliveries_weight: 0.0,
            invalid_message_deliveries_decay: 0.3,
        }
    }
}

impl TopicScoreParams {
    pub fn validate(&self) -> Result<(), ScoreConfigError> {
        if self.topic_weight < 0.0 {
            return Err(ScoreConfigError::TopicWeightNegative(self.topic_weight));
        }
        if self.first_message_deliveries_weight < 0.0 {
            return Err(ScoreConfigError::FirstMessageDeliveriesWeightNegative(
                self.first_message_deliveries_weight,
            ));
        }
        if self.first_message_deliveries_decay <= 0.0
            || self.first_message_deliveries_decay >= 1.0
        {
            return Err(ScoreConfigError::FirstMessageDeliveriesDecayOutOfRange(
                self.first_message_deliveries_decay,
            ));
        }
        if self.mesh_message_deliveries_weight > 0.0 {
            return Err(ScoreConfigError::MeshMessageDeliveriesWeightPositive(
                self.mesh_message_deliveries_weight,
            ));
        }
        if self.mesh_message_deliveries_decay <= 0.0 || self.mesh_message_deliveries_decay >= 1.0 {
            return Err(ScoreConfigError::MeshMessageDeliveriesDecayOutOfRange(
                self.mesh_message_deliveries_decay,
            ));
        }
        if self.mesh_message_deliveries_threshold <= 0.0 {
            return Err(ScoreConfigError::MeshMessageDeliveriesThresholdNotPositive(
                self.mesh_message_deliveries_threshold,
            ));
        }
        if self.mesh_message_deliveries_activation < Duration::from_secs(1) {
            return Err(ScoreConfigError::MeshMessageDeliveriesActivationTooShort(
                self.mesh_message_deliveries_activation,
            ));
        }
        if self.mesh_failure_penalty_weight > 0.0 {
            return Err(ScoreConfigError::MeshFailurePenaltyWeightPositive(
                self.mesh_failure_penalty_weight,
            ));
        }
        if self.mesh_failure_penalty_decay <= 0.0 || self.mesh_failure_penalty_decay >= 1.0 {
            return Err(ScoreConfigError::MeshFailurePenaltyDecayOutOfRange(
                self.mesh_failure_penalty_decay,
            ));
        }
        if self.invalid_message_deliveries_weight > 0.0 {
            return Err(ScoreConfigError::InvalidMessageDeliveriesWeightPositive(
                self.invalid_message_deliveries_weight,
            ));
        }
        if self.invalid_message_deliveries_decay <= 0.0
            || self.invalid_message_deliveries_decay >= 1.0
        {
            return Err(ScoreConfigError::InvalidMessageDeliveriesDecayOutOfRange(
                self.invalid_message_deliveries_decay,
            ));
        }
        Ok(())
    }
}

/// Global scoring parameters, including the per-topic table.
#[derive(Clone)]
pub struct PeerScoreParams {
    pub topics: HashMap<TopicHash, TopicScoreParams>,
    pub topic_score_cap: f64,

    /// Application-specific score callback, e.g. backed by a local
    /// reputation/allow-list system. Weighted by `app_specific_weight`.
    pub app_specific_score: Arc<dyn Fn(&PeerId) -> f64 + Send + Sync>,
    pub app_specific_weight: f64,

    pub ip_colocation_factor_weight: f64,
    pub ip_colocation_factor_threshold: f64,
    pub ip_colocation_factor_whitelist: HashSet<IpAddr>,

    pub behaviour_penalty_weight: f64,
    pub behaviour_penalty_threshold: f64,
    pub behaviour_penalty_decay: f64,

    pub decay_interval: Duration,
    pub decay_to_zero: f64,
    pub retain_score: Duration,
}

impl Default for PeerScoreParams {
    fn default() -> Self {
        PeerScoreParams {
            topics: HashMap::new(),
            topic_score_cap: 3600.0,

            app_specific_score: Arc::new(|_| 0.0),
            app_specific_weight: 1.0,

            ip_colocation_factor_weight: 0.0,
            ip_colocation_factor_threshold: 1.0,
            ip_colocation_factor_whitelist: HashSet::new(),

            behaviour_penalty_weight: 0.0,
            behaviour_penalty_threshold: 0.0,
            behaviour_penalty_decay: 0.2,

            decay_interval: Duration::from_secs(1),
            decay_to_zero: 0.01,
            retain_score: Duration::from_secs(3600),
        }
    }
}

impl std::fmt::Debug for PeerScoreParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerScoreParams")
            .field("topics", &self.topics.keys().collect::<Vec<_>>())
            .field("topic_score_cap", &self.topic_score_cap)
            .field("app_specific_weight", &self.app_specific_weight)
            .field(
                "ip_colocation_factor_weight",
                &self.ip_colocation_factor_weight,
            )
            .field(
                "ip_colocation_factor_threshold",
                &self.ip_colocation_factor_threshold,
            )
            .field("behaviour_penalty_weight", &self.behaviour_penalty_weight)
            .field("decay_interval", &self.decay_interval)
            .field("retain_score", &self.retain_score)
            .finish()
    }
}

impl PeerScoreParams {
    pub fn validate(&self) -> Result<(), ScoreConfigError> {
        if self.ip_colocation_factor_weight > 0.0 {
            return Err(ScoreConfigError::IpColocationFactorWeightPositive(
                self.ip_colocation_factor_weight,
            ));
        }
        if self.ip_colocation_factor_threshold < 1.0 {
            return Err(ScoreConfigError::IpColocationFactorThresholdTooLow(
                self.ip_colocation_factor_threshold,
            ));
        }
        if self.behaviour_penalty_weight > 0.0 {
            return Err(ScoreConfigError::BehaviourPenaltyWeightPositive(
                self.behaviour_penalty_weight,
            ));
        }
        if self.behaviour_penalty_threshold < 0.0 {
            return Err(ScoreConfigError::BehaviourPenaltyThresholdNegative(
                self.behaviour_penalty_threshold,
            ));
        }
        if self.behaviour_penalty_decay <= 0.0 || self.behaviour_penalty_decay >= 1.0 {
            return Err(ScoreConfigError::BehaviourPenaltyDecayOutOfRange(
                self.behaviour_penalty_decay,
            ));
        }
        if self.decay_to_zero <= 0.0 {
            return Err(ScoreConfigError::DecayToZeroNotPositive(self.decay_to_zero));
        }
        for params in self.topics.values() {
            params.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PeerScoreParams::default().validate().is_ok());
        assert!(TopicScoreParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_positive_mesh_message_deliveries_weight() {
        let mut topic = TopicScoreParams::default();
        topic.mesh_message_deliveries_weight = 1.0;
        assert_matches::assert_matches!(
            topic.validate(),
            Err(ScoreConfigError::MeshMessageDeliveriesWeightPositive(_))
        );
    }

    #[test]
    fn rejects_ip_colocation_threshold_below_one() {
        let mut params = PeerScoreParams::default();
        params.ip_colocation_factor_threshold = 0.5;
        assert_matches::assert_matches!(
            params.validate(),
            Err(ScoreConfigError::IpColocationFactorThresholdTooLow(_))
        );
    }

    #[test]
    fn rejects_decay_outside_open_interval() {
        let mut topic = TopicScoreParams::default();
        topic.first_message_deliveries_decay = 1.0;
        assert_matches::assert_matches!(
            topic.validate(),
            Err(ScoreConfigError::FirstMessageDeliveriesDecayOutOfRange(_))
        );

        let mut params = PeerScoreParams::default();
        params.behaviour_penalty_decay = 0.0;
        assert_matches::assert_matches!(
            params.validate(),
            Err(ScoreConfigError::BehaviourPenaltyDecayOutOfRange(_))
        );
    }

    #[test]
    fn propagates_nested_topic_errors() {
        let mut params = PeerScoreParams::default();
        let mut bad_topic = TopicScoreParams::default();
        bad_topic.mesh_message_deliveries_threshold = 0.0;
        params.topics.insert(TopicHash::from("t"), bad_topic);
        assert_matches::assert_matches!(
            params.validate(),
            Err(ScoreConfigError::MeshMessageDeliveriesThresholdNotPositive(_))
        );
    }
}
