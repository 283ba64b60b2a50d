//! The connection-manager capability the engine reads IP endpoints from.

use std::net::IpAddr;

use crate::topic::PeerId;

/// Enumerates the current remote IP endpoints of a peer id. Implemented by
/// the overlay's transport/swarm layer; the scoring core only ever reads
/// from it.
///
/// Failures (the peer is unknown, the transport can't be queried, ...)
/// degrade to an empty list rather than propagating an error — see the
/// crate-level error handling notes.
pub trait ConnectionManager: Send + Sync {
    fn connections(&self, peer: &PeerId) -> Vec<IpAddr>;
}

/// A connection manager that never reports any IP endpoints. Useful as a
/// default when IP colocation scoring is not needed.
#[derive(Debug, Default)]
pub struct NoopConnectionManager;

impl ConnectionManager for NoopConnectionManager {
    fn connections(&self, _peer: &PeerId) -> Vec<IpAddr> {
        Vec::new()
    }
}

/// A connection manager backed by a fixed, test-supplied table. Enabled
/// under `test-utils` for deterministic integration tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct StaticConnectionManager {
    table: parking_lot::Mutex<std::collections::HashMap<PeerId, Vec<IpAddr>>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, peer: PeerId, ips: Vec<IpAddr>) {
        self.table.lock().insert(peer, ips);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ConnectionManager for StaticConnectionManager {
    fn connections(&self, peer: &PeerId) -> Vec<IpAddr> {
        self.table.lock().get(peer).cloned().unwrap_or_default()
    }
}
