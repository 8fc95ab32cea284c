//! Queues shared between the relay and the hub
//!
//! The relay only ever holds the sending ends. Whatever consumes
//! [`HubInbox`] decides what the messages mean.

use super::Connection;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A message received from a peer
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Connection the message arrived on
    pub connection: Arc<Connection>,
    /// Raw text payload
    pub payload: Vec<u8>,
}

impl InboundEvent {
    #[must_use]
    pub fn new(connection: Arc<Connection>, payload: Vec<u8>) -> Self {
        Self { connection, payload }
    }

    /// Payload as text, replacing invalid sequences
    #[must_use]
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Sending ends handed to every connection's pumps
#[derive(Debug, Clone)]
pub struct RelayChannels {
    /// Shared inbound message queue; pushes wait while it is full
    pub inbound: mpsc::Sender<InboundEvent>,
    /// Connections whose inbound pump has stopped, one entry per connection
    pub closed: mpsc::UnboundedSender<Arc<Connection>>,
    /// Connections admitted over HTTP, for the hub to register
    pub registrations: mpsc::UnboundedSender<Arc<Connection>>,
}

/// Receiving ends, owned by the hub
#[derive(Debug)]
pub struct HubInbox {
    pub inbound: mpsc::Receiver<InboundEvent>,
    pub closed: mpsc::UnboundedReceiver<Arc<Connection>>,
    pub registrations: mpsc::UnboundedReceiver<Arc<Connection>>,
}

/// Create the hub-facing queues
///
/// `inbound_capacity` bounds the shared inbound queue; a zero capacity is
/// raised to one.
pub fn hub_channels(inbound_capacity: usize) -> (RelayChannels, HubInbox) {
    let (inbound_tx, inbound_rx) = mpsc::channel(inbound_capacity.max(1));
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();
    let (registrations_tx, registrations_rx) = mpsc::unbounded_channel();

    (
        RelayChannels {
            inbound: inbound_tx,
            closed: closed_tx,
            registrations: registrations_tx,
        },
        HubInbox {
            inbound: inbound_rx,
            closed: closed_rx,
            registrations: registrations_rx,
        },
    )
}
