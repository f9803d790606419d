//! Relay Client Builder

use std::sync::Arc;

use super::config::RelayClientConfig;
use super::relay_client::RelayClient;
use crate::crypto::{CryptoProvider, KeySource, PublicKeySource, SigningKeySource};
use crate::envelope::{JsonFormat, WireFormat};
use crate::error::{RelayError, RelayResult};
use crate::network::{PollingTransport, Transport};

/// Assembles a [`RelayClient`] from configuration and key sources.
///
/// # Example
///
/// ```ignore
/// let client = RelayClient::builder()
///     .config(RelayClientConfig::from_env()?)
///     .shared_key(KeySource::File("shared.key".into()))
///     .signing_key(SigningKeySource::Pkcs8File("device.key".into()))
///     .format(BincodeFormat)
///     .build()?;
/// ```
pub struct RelayClientBuilder<F: WireFormat = JsonFormat> {
    config: RelayClientConfig,
    format: F,
    shared_key: Option<KeySource>,
    signing_key: Option<SigningKeySource>,
    trusted_peer: Option<PublicKeySource>,
    crypto: Option<Arc<CryptoProvider>>,
    polling: Option<Arc<dyn Transport>>,
    socket: Option<Arc<dyn Transport>>,
}

impl RelayClient<JsonFormat> {
    /// Starts a builder using JSON on the wire.
    pub fn builder() -> RelayClientBuilder<JsonFormat> {
        RelayClientBuilder::new()
    }
}

impl Default for RelayClientBuilder<JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayClientBuilder<JsonFormat> {
    pub fn new() -> Self {
        RelayClientBuilder {
            config: RelayClientConfig::default(),
            format: JsonFormat,
            shared_key: None,
            signing_key: None,
            trusted_peer: None,
            crypto: None,
            polling: None,
            socket: None,
        }
    }
}

impl<F: WireFormat> RelayClientBuilder<F> {
    pub fn config(mut self, config: RelayClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Switches the serializer used for payloads and envelopes.
    pub fn format<G: WireFormat>(self, format: G) -> RelayClientBuilder<G> {
        RelayClientBuilder {
            config: self.config,
            format,
            shared_key: self.shared_key,
            signing_key: self.signing_key,
            trusted_peer: self.trusted_peer,
            crypto: self.crypto,
            polling: self.polling,
            socket: self.socket,
        }
    }

    pub fn shared_key(mut self, source: KeySource) -> Self {
        self.shared_key = Some(source);
        self
    }

    pub fn signing_key(mut self, source: SigningKeySource) -> Self {
        self.signing_key = Some(source);
        self
    }

    pub fn trusted_peer(mut self, source: PublicKeySource) -> Self {
        self.trusted_peer = Some(source);
        self
    }

    /// Uses an already-built provider instead of loading key sources.
    pub fn crypto(mut self, crypto: Arc<CryptoProvider>) -> Self {
        self.crypto = Some(crypto);
        self
    }

    pub fn polling_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.polling = Some(transport);
        self
    }

    pub fn socket_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.socket = Some(transport);
        self
    }

    /// Loads keys, builds the polling transport if none was given, and
    /// returns the client.
    pub fn build(self) -> RelayResult<RelayClient<F>> {
        self.config.validate()?;

        let crypto = match self.crypto {
            Some(crypto) => crypto,
            None => {
                let key = self.shared_key.as_ref().ok_or_else(|| {
                    RelayError::Configuration("no shared key or crypto provider given".into())
                })?;
                Arc::new(CryptoProvider::load(
                    key,
                    self.signing_key.as_ref(),
                    self.trusted_peer.as_ref(),
                )?)
            }
        };

        let polling = match self.polling {
            Some(polling) => polling,
            None => Arc::new(PollingTransport::new(
                &self.config.transport,
                &self.config.client_id,
                self.format.content_type(),
            )?),
        };

        Ok(RelayClient::with_transports(
            self.config,
            crypto,
            self.format,
            polling,
            self.socket,
        ))
    }
}
