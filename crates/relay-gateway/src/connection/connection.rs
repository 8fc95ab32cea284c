//! Individual relay connection
//!
//! The record the two pumps coordinate around, and the handle the hub keeps
//! for sending.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{
    self,
    error::{SendError, TrySendError},
};

/// A single peer session
pub struct Connection {
    /// Unique connection ID
    id: String,

    /// Outbound queue; `None` once the hub has closed it
    outbound: Mutex<Option<mpsc::Sender<Vec<u8>>>>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a connection and the receiving end of its outbound queue
    ///
    /// The receiver belongs to the outbound pump. A zero capacity is raised
    /// to one.
    pub fn new(id: String, capacity: usize) -> (Arc<Self>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let connection = Arc::new(Self {
            id,
            outbound: Mutex::new(Some(tx)),
            created_at: Instant::now(),
        });
        (connection, rx)
    }

    /// Generate a new connection ID
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the connection ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a message for the peer, waiting while the queue is full
    ///
    /// Fails once the queue has been closed or the outbound pump has exited.
    pub async fn send(&self, payload: impl Into<Vec<u8>>) -> Result<(), SendError<Vec<u8>>> {
        let payload = payload.into();
        let Some(sender) = self.sender() else {
            return Err(SendError(payload));
        };
        sender.send(payload).await
    }

    /// Queue a message without waiting
    pub fn try_send(&self, payload: impl Into<Vec<u8>>) -> Result<(), TrySendError<Vec<u8>>> {
        let payload = payload.into();
        match self.outbound.lock().as_ref() {
            Some(sender) => sender.try_send(payload),
            None => Err(TrySendError::Closed(payload)),
        }
    }

    /// Close the outbound queue
    ///
    /// Messages already queued are still written, followed by a close frame.
    /// Returns false if the queue was already closed.
    pub fn close(&self) -> bool {
        let closed = self.outbound.lock().take().is_some();
        if closed {
            tracing::debug!(connection_id = %self.id, "Outbound queue closed");
        }
        closed
    }

    /// Check if the outbound queue no longer accepts messages
    pub fn is_closed(&self) -> bool {
        self.outbound
            .lock()
            .as_ref()
            .map_or(true, mpsc::Sender::is_closed)
    }

    fn sender(&self) -> Option<mpsc::Sender<Vec<u8>>> {
        self.outbound.lock().clone()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("created_at", &self.created_at)
            .finish()
    }
}
