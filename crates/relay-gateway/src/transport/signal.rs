//! Shared close flag for the two transport halves

use std::sync::Arc;
use tokio::sync::watch;

/// Close state shared by a reader and writer pair
///
/// Once closed it stays closed. Whichever half closes first makes the other
/// half's pending and future operations fail.
#[derive(Debug, Clone)]
pub(crate) struct CloseSignal {
    state: Arc<watch::Sender<bool>>,
}

impl CloseSignal {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub(crate) fn close(&self) {
        self.state.send_replace(true);
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once the signal is closed
    pub(crate) async fn closed(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so `wait_for` cannot fail here.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
