//! Per-connection pumps
//!
//! Each connection runs one [`InboundPump`] (peer → hub) and one
//! [`OutboundPump`] (hub → peer). They share nothing but the transport's
//! close flag, so either one stopping brings the other down.

mod inbound;
mod outbound;

pub use inbound::InboundPump;
pub use outbound::OutboundPump;

use crate::transport::TransportError;
use relay_common::RelaySettings;
use std::time::Duration;

/// Time allowed to write a frame to the peer
pub const WRITE_WAIT_MS: u64 = 10_000;

/// Time allowed to read the next pong from the peer
pub const PONG_WAIT_MS: u64 = 60_000;

/// Ping period; must be less than the pong wait
pub const PING_PERIOD_MS: u64 = PONG_WAIT_MS * 9 / 10;

/// Default outbound queue capacity per connection
pub const OUTBOUND_CAPACITY: usize = 256;

/// Default inbound message size limit
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Timing and size limits shared by both pumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    pub write_wait: Duration,
    pub pong_wait: Duration,
    pub ping_period: Duration,
    pub max_message_size: usize,
    pub outbound_capacity: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            write_wait: Duration::from_millis(WRITE_WAIT_MS),
            pong_wait: Duration::from_millis(PONG_WAIT_MS),
            ping_period: Duration::from_millis(PING_PERIOD_MS),
            max_message_size: MAX_MESSAGE_SIZE,
            outbound_capacity: OUTBOUND_CAPACITY,
        }
    }
}

impl PumpConfig {
    /// Set the pong wait and derive the ping period as 9/10 of it
    #[must_use]
    pub fn with_pong_wait(mut self, pong_wait: Duration) -> Self {
        self.pong_wait = pong_wait;
        self.ping_period = pong_wait.saturating_mul(9) / 10;
        self
    }

    #[must_use]
    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = limit;
        self
    }
}

impl From<&RelaySettings> for PumpConfig {
    fn from(settings: &RelaySettings) -> Self {
        Self {
            write_wait: settings.write_wait(),
            pong_wait: settings.pong_wait(),
            ping_period: settings.ping_period(),
            max_message_size: settings.max_message_size,
            outbound_capacity: settings.outbound_capacity,
        }
    }
}

/// Why a pump stopped
///
/// Only used for logging and tests; the hub learns of a stop through the
/// closed-connections queue alone.
#[derive(Debug)]
pub enum PumpExit {
    /// A read or write failed, including deadline expiry
    Transport(TransportError),
    /// The hub closed the outbound queue
    QueueClosed,
    /// The hub dropped the inbound queue receiver
    HubGone,
}

impl PumpExit {
    /// Whether the pump stopped because a deadline passed
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

impl std::fmt::Display for PumpExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::QueueClosed => f.write_str("outbound queue closed"),
            Self::HubGone => f.write_str("inbound queue closed"),
        }
    }
}
