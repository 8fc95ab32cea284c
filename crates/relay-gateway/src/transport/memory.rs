//! In-process transport
//!
//! A reader/writer pair backed by channels, with a [`MemoryPeer`] standing in
//! for the remote side. Used by the pump tests and by embedders that want to
//! drive a relay connection without a socket.

use super::{CloseSignal, TransportError, TransportReader, TransportResult, TransportWriter};
use crate::protocol::Frame;
use futures::channel::mpsc;
use futures_util::sink::SinkMapErr;
use futures_util::{SinkExt, StreamExt};

/// Frames travelling from the peer to the reader
pub type MemoryStream = mpsc::UnboundedReceiver<TransportResult<Frame>>;

/// Frames travelling from the writer to the peer
pub type MemorySink = SinkMapErr<mpsc::Sender<Frame>, fn(mpsc::SendError) -> TransportError>;

/// Remote end of an in-memory transport
#[derive(Debug)]
pub struct MemoryPeer {
    incoming: mpsc::UnboundedSender<TransportResult<Frame>>,
    outgoing: mpsc::Receiver<Frame>,
}

impl MemoryPeer {
    /// Deliver a frame to the reader; false once the reader is gone
    pub fn send(&self, frame: Frame) -> bool {
        self.incoming.unbounded_send(Ok(frame)).is_ok()
    }

    /// Make the reader's next read fail with `error`
    pub fn fail(&self, error: TransportError) -> bool {
        self.incoming.unbounded_send(Err(error)).is_ok()
    }

    /// End the inbound stream as a disconnecting peer would
    pub fn hang_up(&self) {
        self.incoming.close_channel();
    }

    /// Next frame written by the writer; `None` once the writer closed
    pub async fn recv(&mut self) -> Option<Frame> {
        self.outgoing.next().await
    }

    /// Frame already written, without waiting
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.outgoing.try_next().ok().flatten()
    }
}

/// Create a connected transport pair
///
/// `write_buffer` is how many frames the writer may have in flight before a
/// write blocks waiting for the peer; zero makes every write wait for the
/// peer to take the frame.
pub fn pair(write_buffer: usize) -> (TransportReader<MemoryStream>, TransportWriter<MemorySink>, MemoryPeer) {
    let (incoming, stream) = mpsc::unbounded();
    let (sink, outgoing) = mpsc::channel(write_buffer);
    let sink: MemorySink = sink.sink_map_err(peer_gone as fn(mpsc::SendError) -> TransportError);

    let signal = CloseSignal::new();
    (
        TransportReader::new(stream, signal.clone()),
        TransportWriter::new(sink, signal),
        MemoryPeer { incoming, outgoing },
    )
}

fn peer_gone(_: mpsc::SendError) -> TransportError {
    TransportError::Disconnected
}
