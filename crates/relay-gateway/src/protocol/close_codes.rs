//! WebSocket close codes
//!
//! The RFC 6455 close codes the relay sends, plus the one browsers send on
//! navigation. Other codes are reported as a close without a code.

/// WebSocket close status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure; the outbound queue was closed by the hub
    Normal = 1000,
    /// Peer is going away, e.g. a browser tab closing
    GoingAway = 1001,
    /// A queued message could not be sent as text
    InternalError = 1011,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1011 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text carried in the close frame
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Normal => "closing",
            Self::GoingAway => "going away",
            Self::InternalError => "internal error",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.reason(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
