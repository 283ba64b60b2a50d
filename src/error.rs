//! Error types crossing the public API boundary.
//!
//! Per the engine's error-handling design, most ingest hooks are infallible
//! no-ops on bad input (unknown peer, stale delivery state) and are only
//! logged; the two error types below are the ones callers actually have to
//! handle.

use thiserror::Error;

/// A `PeerScoreParams`/`TopicScoreParams` bound was violated. Returned from
/// `validate()`, never from the engine itself — by the time an engine
/// exists its params are known-good.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ScoreConfigError {
    #[error("topic weight must be >= 0, got {0}")]
    TopicWeightNegative(f64),
    #[error("first message deliveries weight must be >= 0, got {0}")]
    FirstMessageDeliveriesWeightNegative(f64),
    #[error("first message deliveries decay must be in (0, 1), got {0}")]
    FirstMessageDeliveriesDecayOutOfRange(f64),
    #[error("mesh message deliveries weight must be <= 0, got {0}")]
    MeshMessageDeliveriesWeightPositive(f64),
    #[error("mesh message deliveries decay must be in (0, 1), got {0}")]
    MeshMessageDeliveriesDecayOutOfRange(f64),
    #[error("mesh message deliveries threshold must be > 0, got {0}")]
    MeshMessageDeliveriesThresholdNotPositive(f64),
    #[error("mesh message deliveries activation must be >= 1s, got {0:?}")]
    MeshMessageDeliveriesActivationTooShort(std::time::Duration),
    #[error("mesh failure penalty weight must be <= 0, got {0}")]
    MeshFailurePenaltyWeightPositive(f64),
    #[error("mesh failure penalty decay must be in (0, 1), got {0}")]
    MeshFailurePenaltyDecayOutOfRange(f64),
    #[error("invalid message deliveries weight must be <= 0, got {0}")]
    InvalidMessageDeliveriesWeightPositive(f64),
    #[error("invalid message deliveries decay must be in (0, 1), got {0}")]
    InvalidMessageDeliveriesDecayOutOfRange(f64),
    #[error("IP colocation factor weight must be <= 0, got {0}")]
    IpColocationFactorWeightPositive(f64),
    #[error("IP colocation factor threshold must be >= 1, got {0}")]
    IpColocationFactorThresholdTooLow(f64),
    #[error("behaviour penalty weight must be <= 0, got {0}")]
    BehaviourPenaltyWeightPositive(f64),
    #[error("behaviour penalty threshold must be >= 0, got {0}")]
    BehaviourPenaltyThresholdNegative(f64),
    #[error("behaviour penalty decay must be in (0, 1), got {0}")]
    BehaviourPenaltyDecayOutOfRange(f64),
    #[error("decay to zero must be a small positive epsilon, got {0}")]
    DecayToZeroNotPositive(f64),
}

/// The overlay-supplied `MessageIdFunction` failed. No engine state is
/// mutated when this is returned.
#[derive(Debug, Error)]
#[error("message id computation failed: {0}")]
pub struct MessageIdError(pub String);
