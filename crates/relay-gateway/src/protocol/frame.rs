//! Transport frames
//!
//! The relay works in terms of whole frames. Conversions to and from axum's
//! WebSocket `Message` live here so the pumps never see the wire type.

use super::CloseCode;
use axum::extract::ws::{CloseFrame, Message};
use std::borrow::Cow;

/// Frame type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
    Ping,
    Pong,
    Close,
}

/// One discrete message unit exchanged with the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Application payload
    Text(Vec<u8>),
    /// Binary payload; accepted on the wire but not relayed
    Binary(Vec<u8>),
    /// Heartbeat probe
    Ping(Vec<u8>),
    /// Heartbeat response
    Pong(Vec<u8>),
    /// Close handshake, with the status code when one was given
    Close(Option<CloseCode>),
}

impl Frame {
    /// Empty heartbeat probe
    #[must_use]
    pub fn ping() -> Self {
        Self::Ping(Vec::new())
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Text(_) => FrameKind::Text,
            Self::Binary(_) => FrameKind::Binary,
            Self::Ping(_) => FrameKind::Ping,
            Self::Pong(_) => FrameKind::Pong,
            Self::Close(_) => FrameKind::Close,
        }
    }

    /// Payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(p) | Self::Binary(p) | Self::Ping(p) | Self::Pong(p) => p.len(),
            Self::Close(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into an axum message
    ///
    /// Fails when a text payload is not valid UTF-8.
    pub fn into_message(self) -> Result<Message, std::string::FromUtf8Error> {
        Ok(match self {
            Self::Text(payload) => Message::Text(String::from_utf8(payload)?),
            Self::Binary(payload) => Message::Binary(payload),
            Self::Ping(payload) => Message::Ping(payload),
            Self::Pong(payload) => Message::Pong(payload),
            Self::Close(code) => Message::Close(code.map(|code| CloseFrame {
                code: code.as_u16(),
                reason: Cow::Borrowed(code.reason()),
            })),
        })
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Self::Text(text.into_bytes()),
            Message::Binary(payload) => Self::Binary(payload),
            Message::Ping(payload) => Self::Ping(payload),
            Message::Pong(payload) => Self::Pong(payload),
            Message::Close(frame) => Self::Close(frame.and_then(|f| CloseCode::from_u16(f.code))),
        }
    }
}
