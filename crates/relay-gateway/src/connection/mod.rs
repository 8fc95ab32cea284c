//! Connection records
//!
//! The per-peer connection handle and the queues it shares with the hub.

mod connection;
mod hub;

pub use connection::Connection;
pub use hub::{hub_channels, HubInbox, InboundEvent, RelayChannels};
