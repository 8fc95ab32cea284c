//! Relay server state
//!
//! Application state for the upgrade endpoint.

use crate::admission::OriginPolicy;
use crate::connection::RelayChannels;
use crate::pump::PumpConfig;
use crate::relay::Relay;
use relay_common::RelaySettings;
use std::sync::Arc;

/// Relay application state
///
/// Holds everything the upgrade handler needs; cheap to clone.
#[derive(Clone)]
pub struct RelayState {
    /// Starts pumps for upgraded sockets
    relay: Relay,
    /// Origin check applied before the handshake
    origin_policy: Arc<OriginPolicy>,
    /// Transport write buffer passed to the upgrade
    write_buffer_size: usize,
}

impl RelayState {
    /// Create a new relay state
    pub fn new(relay: Relay, origin_policy: OriginPolicy, write_buffer_size: usize) -> Self {
        Self {
            relay,
            origin_policy: Arc::new(origin_policy),
            write_buffer_size,
        }
    }

    /// Build state from relay settings and the hub's queues
    pub fn from_settings(settings: &RelaySettings, channels: RelayChannels) -> Self {
        Self::new(
            Relay::new(PumpConfig::from(settings), channels),
            OriginPolicy::with_allowed(settings.allowed_origins.clone()),
            settings.write_buffer_size,
        )
    }

    /// Get the relay
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Get the origin policy
    pub fn origin_policy(&self) -> &OriginPolicy {
        &self.origin_policy
    }

    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }
}

impl std::fmt::Debug for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayState")
            .field("config", self.relay.config())
            .field("origin_policy", &self.origin_policy)
            .field("write_buffer_size", &self.write_buffer_size)
            .finish_non_exhaustive()
    }
}
