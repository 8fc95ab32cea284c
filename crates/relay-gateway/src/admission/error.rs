//! Admission error types

use axum::{
    extract::ws::rejection::WebSocketUpgradeRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_common::ErrorResponse;
use thiserror::Error;

/// Why an upgrade request was turned away
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Upgrade requests must be GET
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `Origin` did not match the request host or the allow list
    #[error("Origin not allowed")]
    OriginNotAllowed { origin: Option<String> },

    /// Required WebSocket handshake headers were missing or wrong
    #[error("Not a websocket handshake: {0}")]
    BadHandshake(String),

    /// The connection cannot be upgraded at all
    #[error("Upgrade failed: {reason}")]
    Upgrade { status: StatusCode, reason: String },
}

impl AdmissionError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::OriginNotAllowed { .. } => StatusCode::FORBIDDEN,
            Self::BadHandshake(_) => StatusCode::BAD_REQUEST,
            Self::Upgrade { status, .. } => *status,
        }
    }

    /// Get error code for responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::OriginNotAllowed { .. } => "ORIGIN_NOT_ALLOWED",
            Self::BadHandshake(_) => "BAD_HANDSHAKE",
            Self::Upgrade { .. } => "UPGRADE_FAILED",
        }
    }
}

impl From<WebSocketUpgradeRejection> for AdmissionError {
    fn from(rejection: WebSocketUpgradeRejection) -> Self {
        match rejection {
            WebSocketUpgradeRejection::MethodNotGet(_) => Self::MethodNotAllowed,
            WebSocketUpgradeRejection::ConnectionNotUpgradable(r) => Self::Upgrade {
                status: r.status(),
                reason: r.body_text(),
            },
            other => Self::BadHandshake(other.body_text()),
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ErrorResponse::new(self.error_code(), self.to_string());
        if let Self::OriginNotAllowed { origin: Some(origin) } = &self {
            body = body.with_details(serde_json::json!({ "origin": origin }));
        }
        (status, Json(body)).into_response()
    }
}
