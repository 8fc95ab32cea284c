//! Transport error types

use thiserror::Error;

/// Failure of a single read or write on the transport
///
/// Every variant is fatal to the pump that observed it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport was closed, locally or by the other pump
    #[error("Transport closed")]
    Closed,

    /// The peer ended the stream
    #[error("Peer disconnected")]
    Disconnected,

    /// No frame arrived before the read deadline
    #[error("Read deadline exceeded")]
    ReadTimeout,

    /// The frame could not be written before the write deadline
    #[error("Write deadline exceeded")]
    WriteTimeout,

    /// Inbound message exceeded the configured limit
    #[error("Message of {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    /// Outbound text payload was not UTF-8
    #[error("Invalid text payload: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    /// WebSocket protocol or I/O failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),
}

impl TransportError {
    /// Whether the error came from a deadline rather than the peer
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadTimeout | Self::WriteTimeout)
    }
}

/// Transport result type
pub type TransportResult<T> = Result<T, TransportError>;
