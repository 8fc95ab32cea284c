//! Wire protocol definitions
//!
//! Frame types and close codes exchanged with the peer.

mod close_codes;
mod frame;

pub use close_codes::CloseCode;
pub use frame::{Frame, FrameKind};
