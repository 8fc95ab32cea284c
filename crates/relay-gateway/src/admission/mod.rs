//! Upgrade admission
//!
//! Checks an incoming request before the WebSocket handshake and maps
//! rejections onto HTTP responses.

mod error;
mod origin;

pub use error::AdmissionError;
pub use origin::{validate_request, OriginPolicy};
