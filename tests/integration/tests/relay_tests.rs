//! Relay Integration Tests
//!
//! Each test starts its own relay on an ephemeral port; no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use futures_util::{SinkExt, StreamExt};
use integration_tests::{within, TestServer};
use relay_common::RelaySettings;
use reqwest::{Method, StatusCode};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (server, _inbox) = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

// ============================================================================
// Admission Tests
// ============================================================================

#[tokio::test]
async fn test_post_is_method_not_allowed() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let origin = server.same_origin();

    let response = server.request(Method::POST, Some(&origin)).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(inbox.registrations.try_recv().is_err());
}

#[tokio::test]
async fn test_foreign_origin_is_forbidden() {
    let (server, mut inbox) = TestServer::start().await.unwrap();

    let response = server
        .request(Method::GET, Some("http://evil.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response.text().await.unwrap();
    assert!(body.contains("ORIGIN_NOT_ALLOWED"));
    assert!(inbox.registrations.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_origin_is_forbidden() {
    let (server, _inbox) = TestServer::start().await.unwrap();
    let response = server.request(Method::GET, None).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plain_get_is_bad_request() {
    let (server, _inbox) = TestServer::start().await.unwrap();
    let origin = server.same_origin();

    let response = server.request(Method::GET, Some(&origin)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_websocket_with_foreign_origin_fails() {
    let (server, _inbox) = TestServer::start().await.unwrap();
    assert!(server.connect("http://evil.com").await.is_err());
}

#[tokio::test]
async fn test_allow_listed_origin_connects() {
    let settings = RelaySettings {
        allowed_origins: vec!["https://app.example.com".to_string()],
        ..RelaySettings::default()
    };
    let (server, mut inbox) = TestServer::start_with_settings(settings).await.unwrap();

    let _client = server.connect("https://app.example.com").await.unwrap();
    within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();
}

// ============================================================================
// Relay Tests
// ============================================================================

#[tokio::test]
async fn test_message_round_trip() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let mut client = server.connect(&server.same_origin()).await.unwrap();

    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    client.send(Message::Text("ping from peer".into())).await.unwrap();
    let event = within("inbound event", inbox.inbound.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.connection.id(), connection.id());
    assert_eq!(event.text(), "ping from peer");

    connection.send(event.payload).await.unwrap();
    let reply = within("reply", client.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(reply, Message::Text("ping from peer".into()));
}

#[tokio::test]
async fn test_messages_arrive_in_order() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let mut client = server.connect(&server.same_origin()).await.unwrap();
    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    for i in 0..50 {
        connection.send(format!("message {i}")).await.unwrap();
    }
    for i in 0..50 {
        let message = within("message", client.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(message, Message::Text(format!("message {i}")));
    }
}

#[tokio::test]
async fn test_closing_queue_sends_normal_close() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let mut client = server.connect(&server.same_origin()).await.unwrap();
    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    connection.send("goodbye").await.unwrap();
    assert!(connection.close());

    let first = within("text", client.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(first, Message::Text("goodbye".into()));

    match within("close frame", client.next()).await.unwrap() {
        Some(Ok(Message::Close(Some(frame)))) => assert_eq!(frame.code, CloseCode::Normal),
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_text_payload_ends_with_close_handshake() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let mut client = server.connect(&server.same_origin()).await.unwrap();
    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    connection.send("valid").await.unwrap();
    connection.send(vec![0xff, 0xfe]).await.unwrap();

    let first = within("text", client.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(first, Message::Text("valid".into()));

    match within("close frame", client.next()).await.unwrap() {
        Some(Ok(Message::Close(Some(frame)))) => assert_eq!(frame.code, CloseCode::Error),
        other => panic!("expected close frame, got {other:?}"),
    }

    let closed = within("closed notice", inbox.closed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.id(), connection.id());
}

#[tokio::test]
async fn test_client_disconnect_reports_closed_once() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let client = server.connect(&server.same_origin()).await.unwrap();
    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    drop(client);

    let closed = within("closed notice", inbox.closed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.id(), connection.id());

    // The outbound pump is gone too, so the queue stops accepting.
    within("outbound pump exit", async {
        while !connection.is_closed() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert!(inbox.closed.try_recv().is_err());
}

#[tokio::test]
async fn test_oversized_message_closes_connection() {
    let settings = RelaySettings {
        max_message_size: 16,
        ..RelaySettings::default()
    };
    let (server, mut inbox) = TestServer::start_with_settings(settings).await.unwrap();
    let mut client = server.connect(&server.same_origin()).await.unwrap();
    let connection = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();

    client
        .send(Message::Text("this message is far too long".into()))
        .await
        .unwrap();

    let closed = within("closed notice", inbox.closed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.id(), connection.id());
    assert!(inbox.inbound.try_recv().is_err());
}

#[tokio::test]
async fn test_connections_are_independent() {
    let (server, mut inbox) = TestServer::start().await.unwrap();
    let origin = server.same_origin();

    let mut first = server.connect(&origin).await.unwrap();
    let first_conn = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();
    let second = server.connect(&origin).await.unwrap();
    let second_conn = within("registration", inbox.registrations.recv())
        .await
        .unwrap()
        .unwrap();
    assert_ne!(first_conn.id(), second_conn.id());

    drop(second);
    let closed = within("closed notice", inbox.closed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.id(), second_conn.id());

    first_conn.send("still here").await.unwrap();
    let message = within("message", first.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(message, Message::Text("still here".into()));
}
