//! Write half of a transport

use super::{CloseSignal, TransportError, TransportResult};
use crate::protocol::Frame;
use futures_util::{Sink, SinkExt};
use std::future::Future;
use tokio::time::{timeout_at, Instant};

/// Write side of a split transport
///
/// Exactly one task writes to it. Every write carries its own deadline.
pub struct TransportWriter<K> {
    sink: K,
    signal: CloseSignal,
}

impl<K> TransportWriter<K>
where
    K: Sink<Frame, Error = TransportError> + Unpin,
{
    pub(crate) fn new(sink: K, signal: CloseSignal) -> Self {
        Self { sink, signal }
    }

    /// Write and flush one frame, failing if `deadline` passes first
    pub async fn write_frame(&mut self, frame: Frame, deadline: Instant) -> TransportResult<()> {
        if self.signal.is_closed() {
            return Err(TransportError::Closed);
        }

        let kind = frame.kind();
        let signal = &self.signal;
        let send = timeout_at(deadline, self.sink.send(frame));

        tokio::select! {
            biased;
            () = signal.closed() => Err(TransportError::Closed),
            result = send => match result {
                Ok(written) => written,
                Err(_) => {
                    tracing::trace!(kind = ?kind, "Write deadline exceeded");
                    Err(TransportError::WriteTimeout)
                }
            },
        }
    }

    /// Resolves once either half has closed the transport
    ///
    /// The returned future does not borrow the writer.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let signal = self.signal.clone();
        async move { signal.closed().await }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.is_closed()
    }

    /// Close the transport and shut down the sink
    ///
    /// The sink shutdown is abandoned if it has not finished by `deadline`.
    pub async fn close(&mut self, deadline: Instant) {
        self.signal.close();
        match timeout_at(deadline, self.sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::trace!(error = %e, "Sink close failed"),
            Err(_) => tracing::trace!("Sink close timed out"),
        }
    }
}

impl<K> Drop for TransportWriter<K> {
    fn drop(&mut self) {
        self.signal.close();
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::Frame;
    use crate::transport::{memory, TransportError};
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_write_reaches_peer() {
        let (_reader, mut writer, mut peer) = memory::pair(8);
        let deadline = Instant::now() + Duration::from_secs(1);

        writer.write_frame(Frame::Text(b"hello".to_vec()), deadline).await.unwrap();
        writer.write_frame(Frame::ping(), deadline).await.unwrap();

        assert_eq!(peer.recv().await, Some(Frame::Text(b"hello".to_vec())));
        assert_eq!(peer.recv().await, Some(Frame::ping()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_deadline() {
        // Zero buffer: each write waits for the peer to take the frame.
        let (_reader, mut writer, _peer) = memory::pair(0);
        let start = Instant::now();

        let err = writer
            .write_frame(Frame::Text(b"stuck".to_vec()), start + Duration::from_secs(10))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::WriteTimeout));
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_reader_close_fails_writes() {
        let (reader, mut writer, _peer) = memory::pair(8);
        reader.close();

        let err = writer
            .write_frame(Frame::ping(), Instant::now() + Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));
        assert!(writer.is_closed());
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream() {
        let (_reader, mut writer, mut peer) = memory::pair(8);
        writer.close(Instant::now() + Duration::from_secs(1)).await;
        assert_eq!(peer.recv().await, None);
    }
}
