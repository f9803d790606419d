//! Configuration for the relay client

use std::time::Duration;

use crate::error::{RelayError, RelayResult};
use crate::network::{ReconnectPolicy, TransportConfig};

/// Environment variable overriding the client id.
pub const ENV_CLIENT_ID: &str = "SEALPOST_CLIENT_ID";
/// Environment variable overriding the relay host.
pub const ENV_RELAY_HOST: &str = "SEALPOST_RELAY_HOST";
/// Environment variable enabling TLS (`1`/`true`).
pub const ENV_USE_TLS: &str = "SEALPOST_USE_TLS";
/// Environment variable setting the polling request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SEALPOST_REQUEST_TIMEOUT_SECS";

/// Configuration for the relay client.
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// Our identifier on the relay; stamped as envelope origin.
    pub client_id: String,
    /// Transport configuration.
    pub transport: TransportConfig,
    /// Redial policy used by `reconnect_socket`.
    pub reconnect: ReconnectPolicy,
    /// Inbound queue depth between the producer task and the caller.
    pub inbox_capacity: usize,
    /// TTL (seconds) stamped on outbound envelopes when none is given.
    pub default_ttl: Option<u64>,
}

impl Default for RelayClientConfig {
    fn default() -> Self {
        RelayClientConfig {
            client_id: uuid::Uuid::new_v4().to_string(),
            transport: TransportConfig::default(),
            reconnect: ReconnectPolicy::default(),
            inbox_capacity: 10,
            default_ttl: None,
        }
    }
}

impl RelayClientConfig {
    /// Creates a config for `client_id` talking to `relay_host`.
    pub fn new(client_id: &str, relay_host: &str) -> Self {
        RelayClientConfig {
            client_id: client_id.to_string(),
            transport: TransportConfig::new(relay_host),
            ..Default::default()
        }
    }

    /// Builds a config from `SEALPOST_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RelayClientConfig::default();

        if let Some(id) = lookup(ENV_CLIENT_ID) {
            config.client_id = id;
        }
        if let Some(host) = lookup(ENV_RELAY_HOST) {
            config.transport.relay_host = host;
        }
        if let Some(value) = lookup(ENV_USE_TLS) {
            config.transport.use_tls = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(RelayError::Configuration(format!(
                        "{} must be a boolean, got {:?}",
                        ENV_USE_TLS, other
                    )))
                }
            };
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = value.parse().map_err(|_| {
                RelayError::Configuration(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_REQUEST_TIMEOUT_SECS, value
                ))
            })?;
            config.transport.request_timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity;
        self
    }

    pub fn with_default_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl = Some(ttl_secs);
        self
    }

    /// Rejects configs the client cannot run with.
    pub fn validate(&self) -> RelayResult<()> {
        if self.client_id.is_empty() {
            return Err(RelayError::Configuration("client id is empty".into()));
        }
        if self.inbox_capacity == 0 {
            return Err(RelayError::Configuration(
                "inbox capacity must be at least 1".into(),
            ));
        }
        self.transport.validate()?;
        Ok(())
    }
}
