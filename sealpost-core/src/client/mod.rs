//! Relay Client
//!
//! Orchestrates the envelope codec, the crypto provider and the transports.

mod builder;
mod config;
mod inbox;
mod relay_client;

pub use builder::RelayClientBuilder;
pub use config::{
    RelayClientConfig, ENV_CLIENT_ID, ENV_RELAY_HOST, ENV_REQUEST_TIMEOUT_SECS, ENV_USE_TLS,
};
pub use inbox::Inbox;
pub use relay_client::RelayClient;
