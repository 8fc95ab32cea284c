//! Connection setup
//!
//! Turns an upgraded transport into a running connection: one outbound
//! queue, one inbound pump task and one outbound pump task.

use crate::connection::{Connection, RelayChannels};
use crate::protocol::Frame;
use crate::pump::{InboundPump, OutboundPump, PumpConfig};
use crate::transport::{TransportError, TransportReader, TransportResult, TransportWriter};
use futures_util::{Sink, Stream};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Starts pumps for admitted transports
#[derive(Debug, Clone)]
pub struct Relay {
    config: PumpConfig,
    channels: RelayChannels,
}

impl Relay {
    pub fn new(config: PumpConfig, channels: RelayChannels) -> Self {
        Self { config, channels }
    }

    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    pub fn channels(&self) -> &RelayChannels {
        &self.channels
    }

    /// Start a connection over an already-upgraded transport
    ///
    /// Both pumps run as independent tasks; the returned handle is the only
    /// way to reach the peer. When the inbound pump stops, the handle shows
    /// up once on the closed queue.
    pub fn accept<S, K>(&self, reader: TransportReader<S>, writer: TransportWriter<K>) -> Arc<Connection>
    where
        S: Stream<Item = TransportResult<Frame>> + Unpin + Send + 'static,
        K: Sink<Frame, Error = TransportError> + Unpin + Send + 'static,
    {
        let (connection, queue) = Connection::new(Connection::generate_id(), self.config.outbound_capacity);
        self.spawn_pumps(&connection, queue, reader, writer);
        connection
    }

    /// Like [`accept`](Self::accept), also pushing the handle on the
    /// registrations queue
    ///
    /// The registration is queued before either pump starts, so the hub
    /// never sees an event or a closed notice for a connection it has not
    /// been told about.
    pub fn accept_registered<S, K>(&self, reader: TransportReader<S>, writer: TransportWriter<K>) -> Arc<Connection>
    where
        S: Stream<Item = TransportResult<Frame>> + Unpin + Send + 'static,
        K: Sink<Frame, Error = TransportError> + Unpin + Send + 'static,
    {
        let (connection, queue) = Connection::new(Connection::generate_id(), self.config.outbound_capacity);

        if self.channels.registrations.send(connection.clone()).is_err() {
            // Nobody can ever send to it; let the pumps wind down.
            tracing::warn!(connection_id = %connection.id(), "Hub is not accepting registrations");
            connection.close();
        }

        self.spawn_pumps(&connection, queue, reader, writer);
        connection
    }

    fn spawn_pumps<S, K>(
        &self,
        connection: &Arc<Connection>,
        queue: mpsc::Receiver<Vec<u8>>,
        reader: TransportReader<S>,
        writer: TransportWriter<K>,
    ) where
        S: Stream<Item = TransportResult<Frame>> + Unpin + Send + 'static,
        K: Sink<Frame, Error = TransportError> + Unpin + Send + 'static,
    {
        let outbound = OutboundPump::new(connection.clone(), writer, queue, &self.config);
        tokio::spawn(outbound.run());

        let inbound = InboundPump::new(
            connection.clone(),
            reader,
            self.channels.inbound.clone(),
            self.channels.closed.clone(),
            &self.config,
        );
        tokio::spawn(inbound.run());

        tracing::info!(connection_id = %connection.id(), "Connection established");
    }
}
