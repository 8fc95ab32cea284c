//! Outbound pump: connection queue and heartbeat → peer

use super::{PumpConfig, PumpExit};
use crate::connection::Connection;
use crate::protocol::{CloseCode, Frame};
use crate::transport::{TransportError, TransportResult, TransportWriter};
use futures_util::Sink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Serializes every write to the transport
pub struct OutboundPump<K> {
    connection: Arc<Connection>,
    writer: TransportWriter<K>,
    queue: mpsc::Receiver<Vec<u8>>,
    write_wait: Duration,
    ping_period: Duration,
}

impl<K> OutboundPump<K>
where
    K: Sink<Frame, Error = TransportError> + Unpin,
{
    pub fn new(
        connection: Arc<Connection>,
        writer: TransportWriter<K>,
        queue: mpsc::Receiver<Vec<u8>>,
        config: &PumpConfig,
    ) -> Self {
        Self {
            connection,
            writer,
            queue,
            write_wait: config.write_wait,
            ping_period: config.ping_period,
        }
    }

    /// Run until the queue is closed, a write fails, or the transport closes
    ///
    /// One event per iteration: a queued message or a heartbeat tick. On
    /// exit the timer is stopped and then the transport is closed.
    pub async fn run(mut self) -> PumpExit {
        let mut heartbeat = interval_at(Instant::now() + self.ping_period, self.ping_period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let exit = loop {
            tokio::select! {
                message = self.queue.recv() => match message {
                    Some(payload) => match self.write(Frame::Text(payload)).await {
                        Ok(()) => {}
                        Err(e @ TransportError::InvalidText(_)) => {
                            // Nothing reached the wire, so the peer still gets a close handshake.
                            tracing::warn!(connection_id = %self.connection.id(), error = %e, "Outbound message is not text");
                            self.close_best_effort(CloseCode::InternalError).await;
                            break PumpExit::Transport(e);
                        }
                        Err(e) => break PumpExit::Transport(e),
                    },
                    None => {
                        self.close_best_effort(CloseCode::Normal).await;
                        break PumpExit::QueueClosed;
                    }
                },
                _ = heartbeat.tick() => {
                    if let Err(e) = self.write(Frame::ping()).await {
                        break PumpExit::Transport(e);
                    }
                    tracing::trace!(connection_id = %self.connection.id(), "Ping sent");
                }
                () = self.writer.closed() => break PumpExit::Transport(TransportError::Closed),
            }
        };

        drop(heartbeat);
        self.writer.close(Instant::now() + self.write_wait).await;

        tracing::debug!(
            connection_id = %self.connection.id(),
            reason = %exit,
            "Outbound pump stopped"
        );
        exit
    }

    /// Send a close frame; the pump is stopping either way
    async fn close_best_effort(&mut self, code: CloseCode) {
        if let Err(e) = self.write(Frame::Close(Some(code))).await {
            tracing::trace!(connection_id = %self.connection.id(), error = %e, "Close frame not sent");
        }
    }

    /// Write one frame under a fresh write deadline
    async fn write(&mut self, frame: Frame) -> TransportResult<()> {
        let deadline = Instant::now() + self.write_wait;
        self.writer.write_frame(frame, deadline).await
    }
}
