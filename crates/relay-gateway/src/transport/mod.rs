//! Frame-level transport capability
//!
//! A transport is split into a [`TransportReader`] and a [`TransportWriter`]
//! that share one close flag. The reader carries the liveness deadline and
//! the inbound size limit; the writer applies a deadline to every write.
//! Dropping or closing either half closes the transport for both.

mod error;
pub mod memory;
mod reader;
mod signal;
pub mod websocket;
mod writer;

pub use error::{TransportError, TransportResult};
pub use reader::TransportReader;
pub use writer::TransportWriter;

pub(crate) use signal::CloseSignal;
