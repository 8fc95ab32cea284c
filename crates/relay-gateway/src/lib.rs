//! # relay-gateway
//!
//! WebSocket relay between remote peers and an application hub. Each
//! admitted peer gets a pair of pumps; the hub sees only queues.

pub mod admission;
pub mod connection;
pub mod protocol;
pub mod pump;
pub mod relay;
pub mod server;
pub mod transport;

pub use connection::{hub_channels, Connection, HubInbox, InboundEvent, RelayChannels};
pub use pump::PumpConfig;
pub use relay::Relay;
