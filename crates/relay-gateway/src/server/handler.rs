//! WebSocket upgrade handler
//!
//! Admits the request, performs the upgrade and hands the socket to the relay.

use crate::admission::{validate_request, AdmissionError};
use crate::server::RelayState;
use crate::transport::websocket;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};

/// Relay upgrade handler
///
/// Mounted for every method so that non-GET requests get our 405 rather
/// than the router's. Checks run in order: method, origin, handshake.
pub async fn upgrade_handler(
    State(state): State<RelayState>,
    method: Method,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if let Err(e) = validate_request(&method, &headers, state.origin_policy()) {
        tracing::warn!(method = %method, error = %e, "Upgrade request rejected");
        return e.into_response();
    }

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            let e = AdmissionError::from(rejection);
            tracing::warn!(error = %e, "Upgrade handshake rejected");
            return e.into_response();
        }
    };

    upgrade
        .write_buffer_size(state.write_buffer_size())
        .max_message_size(state.relay().config().max_message_size)
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| handle_socket(state, socket))
}

/// Start pumps for an upgraded socket and register it with the hub
async fn handle_socket(state: RelayState, socket: WebSocket) {
    let (reader, writer) = websocket::split(socket);
    state.relay().accept_registered(reader, writer);
}
