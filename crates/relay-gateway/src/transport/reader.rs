//! Read half of a transport

use super::{CloseSignal, TransportError, TransportResult};
use crate::protocol::Frame;
use futures_util::{Stream, StreamExt};
use tokio::time::{timeout_at, Instant};

/// Read side of a split transport
///
/// Holds the liveness deadline and the inbound size limit. Exactly one task
/// reads from it.
pub struct TransportReader<S> {
    stream: S,
    read_deadline: Option<Instant>,
    max_message_size: Option<usize>,
    signal: CloseSignal,
}

impl<S> TransportReader<S>
where
    S: Stream<Item = TransportResult<Frame>> + Unpin,
{
    pub(crate) fn new(stream: S, signal: CloseSignal) -> Self {
        Self {
            stream,
            read_deadline: None,
            max_message_size: None,
            signal,
        }
    }

    /// Reads after `deadline` fail with `ReadTimeout`
    pub fn set_read_deadline(&mut self, deadline: Instant) {
        self.read_deadline = Some(deadline);
    }

    #[must_use]
    pub fn read_deadline(&self) -> Option<Instant> {
        self.read_deadline
    }

    /// Text or binary frames larger than `limit` bytes fail the read
    pub fn set_max_message_size(&mut self, limit: usize) {
        self.max_message_size = Some(limit);
    }

    /// Wait for the next frame
    pub async fn read_frame(&mut self) -> TransportResult<Frame> {
        if self.signal.is_closed() {
            return Err(TransportError::Closed);
        }

        let deadline = self.read_deadline;
        let signal = &self.signal;
        let next = self.stream.next();

        let frame = tokio::select! {
            biased;
            () = signal.closed() => return Err(TransportError::Closed),
            item = until(deadline, next) => item?,
        };

        let frame = frame.ok_or(TransportError::Disconnected)??;
        self.check_size(&frame)?;
        Ok(frame)
    }

    fn check_size(&self, frame: &Frame) -> TransportResult<()> {
        let Some(limit) = self.max_message_size else {
            return Ok(());
        };
        match frame {
            Frame::Text(payload) | Frame::Binary(payload) if payload.len() > limit => {
                Err(TransportError::MessageTooLarge {
                    size: payload.len(),
                    limit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Close the transport; the writer's operations fail from here on
    pub fn close(&self) {
        self.signal.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.is_closed()
    }
}

impl<S> Drop for TransportReader<S> {
    fn drop(&mut self) {
        self.signal.close();
    }
}

async fn until<F: std::future::Future>(deadline: Option<Instant>, fut: F) -> TransportResult<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fut)
            .await
            .map_err(|_| TransportError::ReadTimeout),
        None => Ok(fut.await),
    }
}
