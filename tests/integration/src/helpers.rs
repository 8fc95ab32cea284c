//! Test helpers for integration tests
//!
//! Provides a relay server on an ephemeral port, plus WebSocket and HTTP
//! clients pointed at it.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use relay_common::RelaySettings;
use relay_gateway::server::{create_app, serve, RelayState};
use relay_gateway::{hub_channels, HubInbox};
use reqwest::{Client, Response};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Client side of a relay connection
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for any single event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    settings: RelaySettings,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a relay with default settings
    pub async fn start() -> Result<(Self, HubInbox)> {
        Self::start_with_settings(RelaySettings::default()).await
    }

    /// Start a relay with custom settings
    ///
    /// The returned inbox receives everything the relay hands to the hub.
    pub async fn start_with_settings(settings: RelaySettings) -> Result<(Self, HubInbox)> {
        let (channels, inbox) = hub_channels(settings.inbound_capacity);
        let state = RelayState::from_settings(&settings, channels);
        let app = create_app(&settings.path, state);

        // Bind to an ephemeral port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(EVENT_TIMEOUT).build()?;

        Ok((
            Self {
                addr,
                client,
                settings,
                _handle: handle,
            },
            inbox,
        ))
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Origin the relay accepts without an allow list
    pub fn same_origin(&self) -> String {
        self.base_url()
    }

    /// URL of the upgrade endpoint
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, self.settings.path)
    }

    /// Open a WebSocket connection presenting `origin`
    pub async fn connect(&self, origin: &str) -> Result<WsClient> {
        let mut request = self.ws_url().into_client_request()?;
        request.headers_mut().insert("origin", HeaderValue::from_str(origin)?);

        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }

    /// Make a request to the upgrade endpoint
    pub async fn request(&self, method: reqwest::Method, origin: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), self.settings.path);
        let mut builder = self.client.request(method, &url);
        if let Some(origin) = origin {
            builder = builder.header("origin", origin);
        }
        Ok(builder.send().await?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }
}

/// Await `future`, failing after [`EVENT_TIMEOUT`]
pub async fn within<F: Future>(what: &str, future: F) -> Result<F::Output> {
    tokio::time::timeout(EVENT_TIMEOUT, future)
        .await
        .map_err(|_| anyhow!("timed out waiting for {what}"))
}
