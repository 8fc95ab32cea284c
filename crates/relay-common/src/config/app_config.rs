//! Application configuration structs
//!
//! Loads configuration from environment variables.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    #[serde(default)]
    pub relay: RelaySettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse an `APP_ENV` value, case-insensitively
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Listening socket configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection relay tunables
///
/// Durations are kept in milliseconds so they map one-to-one onto the
/// `RELAY_*_MS` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Route the upgrade handler is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Time allowed to write a single frame to the peer
    #[serde(default = "default_write_wait_ms")]
    pub write_wait_ms: u64,
    /// Time allowed between pongs before the peer is considered dead
    #[serde(default = "default_pong_wait_ms")]
    pub pong_wait_ms: u64,
    /// Ping period; `None` derives 9/10 of `pong_wait_ms`
    #[serde(default)]
    pub ping_period_ms: Option<u64>,
    /// Largest inbound message accepted, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Slots in each connection's outbound queue
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
    /// Slots in the shared inbound event queue
    #[serde(default = "default_inbound_capacity")]
    pub inbound_capacity: usize,
    /// Transport write buffer size used for the upgrade
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: usize,
    /// Extra origins accepted besides `http://{Host}`
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            write_wait_ms: default_write_wait_ms(),
            pong_wait_ms: default_pong_wait_ms(),
            ping_period_ms: None,
            max_message_size: default_max_message_size(),
            outbound_capacity: default_outbound_capacity(),
            inbound_capacity: default_inbound_capacity(),
            write_buffer_size: default_write_buffer_size(),
            allowed_origins: Vec::new(),
        }
    }
}

impl RelaySettings {
    #[must_use]
    pub fn write_wait(&self) -> Duration {
        Duration::from_millis(self.write_wait_ms)
    }

    #[must_use]
    pub fn pong_wait(&self) -> Duration {
        Duration::from_millis(self.pong_wait_ms)
    }

    /// Heartbeat period, derived from the pong wait unless set explicitly
    #[must_use]
    pub fn ping_period(&self) -> Duration {
        Duration::from_millis(
            self.ping_period_ms
                .unwrap_or(self.pong_wait_ms.saturating_mul(9) / 10),
        )
    }

    /// Reject combinations the pumps cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "RELAY_PATH",
                format!("{} must start with '/'", self.path),
            ));
        }
        if self.write_wait_ms == 0 {
            return Err(ConfigError::InvalidValue("RELAY_WRITE_WAIT_MS", "must be positive".to_string()));
        }
        for (name, value) in [
            ("RELAY_WRITE_WAIT_MS", self.write_wait_ms),
            ("RELAY_PONG_WAIT_MS", self.pong_wait_ms),
        ] {
            if value > MAX_WAIT_MS {
                return Err(ConfigError::InvalidValue(name, format!("must be at most {MAX_WAIT_MS}ms")));
            }
        }
        if self.ping_period().is_zero() {
            return Err(ConfigError::InvalidValue("RELAY_PING_PERIOD_MS", "must be positive".to_string()));
        }
        if self.ping_period() >= self.pong_wait() {
            return Err(ConfigError::InvalidValue(
                "RELAY_PING_PERIOD_MS",
                format!(
                    "{}ms must be less than pong wait {}ms",
                    self.ping_period().as_millis(),
                    self.pong_wait_ms
                ),
            ));
        }
        for (name, value) in [
            ("RELAY_MAX_MESSAGE_SIZE", self.max_message_size),
            ("RELAY_OUTBOUND_CAPACITY", self.outbound_capacity),
            ("RELAY_INBOUND_CAPACITY", self.inbound_capacity),
            ("RELAY_WRITE_BUFFER_SIZE", self.write_buffer_size),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(name, "must be positive".to_string()));
            }
        }
        Ok(())
    }
}

/// Longest write or pong wait accepted; deadlines are computed from now
const MAX_WAIT_MS: u64 = 24 * 60 * 60 * 1000;

// Default value functions
fn default_app_name() -> String {
    "relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_write_wait_ms() -> u64 {
    10_000
}

fn default_pong_wait_ms() -> u64 {
    60_000
}

fn default_max_message_size() -> usize {
    64 * 1024
}

fn default_outbound_capacity() -> usize {
    256
}

fn default_inbound_capacity() -> usize {
    1024
}

fn default_write_buffer_size() -> usize {
    1024
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// the relay settings do not validate
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_var(&lookup, "GATEWAY_PORT")?.ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?,
            },
            relay: RelaySettings {
                path: lookup("RELAY_PATH").unwrap_or_else(default_path),
                write_wait_ms: parse_var(&lookup, "RELAY_WRITE_WAIT_MS")?.unwrap_or_else(default_write_wait_ms),
                pong_wait_ms: parse_var(&lookup, "RELAY_PONG_WAIT_MS")?.unwrap_or_else(default_pong_wait_ms),
                ping_period_ms: parse_var(&lookup, "RELAY_PING_PERIOD_MS")?,
                max_message_size: parse_var(&lookup, "RELAY_MAX_MESSAGE_SIZE")?
                    .unwrap_or_else(default_max_message_size),
                outbound_capacity: parse_var(&lookup, "RELAY_OUTBOUND_CAPACITY")?
                    .unwrap_or_else(default_outbound_capacity),
                inbound_capacity: parse_var(&lookup, "RELAY_INBOUND_CAPACITY")?
                    .unwrap_or_else(default_inbound_capacity),
                write_buffer_size: parse_var(&lookup, "RELAY_WRITE_BUFFER_SIZE")?
                    .unwrap_or_else(default_write_buffer_size),
                allowed_origins: lookup("RELAY_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        };

        config.relay.validate()?;
        Ok(config)
    }
}

/// Parse an optional variable, failing loudly on malformed values
fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
