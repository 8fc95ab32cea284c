//! Inbound pump: peer → shared inbound queue

use super::{PumpConfig, PumpExit};
use crate::connection::{Connection, InboundEvent};
use crate::protocol::Frame;
use crate::transport::{TransportReader, TransportResult};
use futures_util::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Reports the connection on the closed queue when dropped
struct ClosedNotice {
    connection: Arc<Connection>,
    closed: mpsc::UnboundedSender<Arc<Connection>>,
}

impl Drop for ClosedNotice {
    fn drop(&mut self) {
        if self.closed.send(self.connection.clone()).is_err() {
            tracing::trace!(connection_id = %self.connection.id(), "Closed queue has no receiver");
        }
    }
}

/// Moves text frames from the transport to the shared inbound queue
pub struct InboundPump<S> {
    // Field order is drop order: notify the hub, then close the transport.
    notice: ClosedNotice,
    reader: TransportReader<S>,
    inbound: mpsc::Sender<InboundEvent>,
    pong_wait: Duration,
    max_message_size: usize,
}

impl<S> InboundPump<S>
where
    S: Stream<Item = TransportResult<Frame>> + Unpin,
{
    pub fn new(
        connection: Arc<Connection>,
        reader: TransportReader<S>,
        inbound: mpsc::Sender<InboundEvent>,
        closed: mpsc::UnboundedSender<Arc<Connection>>,
        config: &PumpConfig,
    ) -> Self {
        Self {
            notice: ClosedNotice { connection, closed },
            reader,
            inbound,
            pong_wait: config.pong_wait,
            max_message_size: config.max_message_size,
        }
    }

    /// Run until the transport fails or the hub goes away
    ///
    /// However it ends (including by panic), the connection is pushed onto
    /// the closed queue exactly once and the transport is closed.
    pub async fn run(mut self) -> PumpExit {
        self.reader.set_max_message_size(self.max_message_size);
        self.reader.set_read_deadline(Instant::now() + self.pong_wait);

        let exit = loop {
            let frame = match self.reader.read_frame().await {
                Ok(frame) => frame,
                Err(e) => break PumpExit::Transport(e),
            };

            match frame {
                Frame::Pong(_) => {
                    self.reader.set_read_deadline(Instant::now() + self.pong_wait);
                    tracing::trace!(connection_id = %self.connection().id(), "Pong received");
                }
                Frame::Text(payload) => {
                    let event = InboundEvent::new(self.connection().clone(), payload);
                    if self.inbound.send(event).await.is_err() {
                        break PumpExit::HubGone;
                    }
                }
                Frame::Close(code) => {
                    tracing::trace!(connection_id = %self.connection().id(), code = ?code, "Close frame received");
                }
                other => {
                    tracing::trace!(connection_id = %self.connection().id(), kind = ?other.kind(), "Frame ignored");
                }
            }
        };

        tracing::debug!(
            connection_id = %self.connection().id(),
            reason = %exit,
            "Inbound pump stopped"
        );
        exit
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.notice.connection
    }
}
