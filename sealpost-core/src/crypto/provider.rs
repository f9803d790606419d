//! Crypto Provider
//!
//! Bundles the key material loaded at startup. Every operation is a pure
//! function of the held keys, so one provider can be shared across tasks
//! behind an `Arc` without further locking.

use super::encryption::{decrypt, decrypt_from_text, encrypt, encrypt_to_text, SymmetricKey};
use super::error::CryptoError;
use super::keys::{KeySource, PublicKeySource, SigningKeySource};
use super::signing::{check_signature, PublicKey, SigningKeyPair};

#[derive(Debug)]
pub struct CryptoProvider {
    key: SymmetricKey,
    signing_key: Option<SigningKeyPair>,
    trusted_peer: Option<PublicKey>,
}

impl CryptoProvider {
    /// Creates a provider that encrypts but neither signs nor verifies.
    pub fn new(key: SymmetricKey) -> Self {
        CryptoProvider {
            key,
            signing_key: None,
            trusted_peer: None,
        }
    }

    /// Loads all key material from explicit sources.
    pub fn load(
        key: &KeySource,
        signing_key: Option<&SigningKeySource>,
        trusted_peer: Option<&PublicKeySource>,
    ) -> Result<Self, CryptoError> {
        let mut provider = CryptoProvider::new(key.load()?);
        if let Some(source) = signing_key {
            provider.signing_key = Some(source.load()?);
        }
        if let Some(source) = trusted_peer {
            provider.trusted_peer = Some(source.load()?);
        }
        Ok(provider)
    }

    /// Signs outbound envelopes with `signing_key`.
    pub fn with_signing_key(mut self, signing_key: SigningKeyPair) -> Self {
        self.signing_key = Some(signing_key);
        self
    }

    /// Requires inbound envelopes to carry a valid signature from `peer`.
    pub fn with_trusted_peer(mut self, peer: PublicKey) -> Self {
        self.trusted_peer = Some(peer);
        self
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        encrypt(&self.key, plaintext)
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        decrypt(&self.key, data)
    }

    pub fn encrypt_to_text(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        encrypt_to_text(&self.key, plaintext)
    }

    pub fn decrypt_from_text(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        decrypt_from_text(&self.key, text)
    }

    /// Signs `message` if a signing key is configured.
    pub fn sign(&self, message: &[u8]) -> Result<Option<String>, CryptoError> {
        self.signing_key
            .as_ref()
            .map(|key| key.sign(message).map(|sig| sig.to_base64()))
            .transpose()
    }

    /// Checks an inbound signature against the trusted peer, if one is set.
    ///
    /// Without a trusted peer every envelope passes, signed or not.
    pub fn check_inbound(&self, message: &[u8], signature: Option<&str>) -> Result<(), CryptoError> {
        let Some(peer) = &self.trusted_peer else {
            return Ok(());
        };
        let signature = signature.ok_or(CryptoError::SignatureMissing)?;
        check_signature(peer, message, signature)
    }

    pub fn signing_public_key(&self) -> Option<PublicKey> {
        self.signing_key.as_ref().map(SigningKeyPair::public_key)
    }

    pub fn trusted_peer(&self) -> Option<&PublicKey> {
        self.trusted_peer.as_ref()
    }
}
