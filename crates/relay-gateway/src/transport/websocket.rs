//! axum WebSocket adapter

use super::{CloseSignal, TransportError, TransportReader, TransportResult, TransportWriter};
use crate::protocol::Frame;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Write side of an upgraded socket
///
/// Frames are converted to messages in `start_send`, so a frame that cannot
/// be encoded fails before anything is buffered and the socket can still be
/// closed cleanly afterwards.
pub struct WebSocketSink {
    inner: SplitSink<WebSocket, Message>,
}

impl Sink<Frame> for WebSocketSink {
    type Error = TransportError;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<TransportResult<()>> {
        self.inner.poll_ready_unpin(cx).map_err(TransportError::from)
    }

    fn start_send(mut self: Pin<&mut Self>, frame: Frame) -> TransportResult<()> {
        let message = frame.into_message()?;
        self.inner.start_send_unpin(message)?;
        Ok(())
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<TransportResult<()>> {
        self.inner.poll_flush_unpin(cx).map_err(TransportError::from)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<TransportResult<()>> {
        self.inner.poll_close_unpin(cx).map_err(TransportError::from)
    }
}

/// Split an upgraded socket into reader and writer halves
pub fn split(
    socket: WebSocket,
) -> (
    TransportReader<impl Stream<Item = TransportResult<Frame>> + Unpin + Send + 'static>,
    TransportWriter<WebSocketSink>,
) {
    let (sink, stream) = socket.split();
    let stream = stream.map(read_frame);

    let signal = CloseSignal::new();
    (
        TransportReader::new(stream, signal.clone()),
        TransportWriter::new(WebSocketSink { inner: sink }, signal),
    )
}

fn read_frame(message: Result<Message, axum::Error>) -> TransportResult<Frame> {
    Ok(Frame::from(message?))
}
