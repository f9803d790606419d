//! Key Sources
//!
//! Explicit descriptions of where key material comes from. Keys are loaded
//! once, when the crypto provider is built, and never re-read.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::encryption::SymmetricKey;
use super::error::CryptoError;
use super::signing::{PublicKey, SigningKeyPair};

/// Where the pre-shared symmetric key comes from.
#[derive(Clone)]
pub enum KeySource {
    /// Raw key bytes supplied directly.
    Bytes(Vec<u8>),
    /// File holding the raw key bytes.
    File(PathBuf),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Bytes(bytes) => write!(f, "Bytes([REDACTED; {}])", bytes.len()),
            KeySource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl KeySource {
    pub fn load(&self) -> Result<SymmetricKey, CryptoError> {
        match self {
            KeySource::Bytes(bytes) => SymmetricKey::from_slice(bytes),
            KeySource::File(path) => SymmetricKey::from_file(path),
        }
    }
}

/// Where the sender's signing key pair comes from.
#[derive(Clone)]
pub enum SigningKeySource {
    /// PKCS#8 document supplied directly.
    Pkcs8(Vec<u8>),
    /// File holding a PKCS#8 document.
    Pkcs8File(PathBuf),
}

impl std::fmt::Debug for SigningKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningKeySource::Pkcs8(_) => write!(f, "Pkcs8([REDACTED])"),
            SigningKeySource::Pkcs8File(path) => f.debug_tuple("Pkcs8File").field(path).finish(),
        }
    }
}

impl SigningKeySource {
    pub fn load(&self) -> Result<SigningKeyPair, CryptoError> {
        match self {
            SigningKeySource::Pkcs8(bytes) => SigningKeyPair::from_pkcs8(bytes),
            SigningKeySource::Pkcs8File(path) => SigningKeyPair::from_pkcs8_file(path),
        }
    }
}

/// Where the trusted peer's public key comes from.
#[derive(Debug, Clone)]
pub enum PublicKeySource {
    /// Uncompressed SEC1 point.
    Bytes(Vec<u8>),
    /// File holding an uncompressed SEC1 point.
    File(PathBuf),
}

impl PublicKeySource {
    pub fn load(&self) -> Result<PublicKey, CryptoError> {
        match self {
            PublicKeySource::Bytes(bytes) => PublicKey::from_bytes(bytes),
            PublicKeySource::File(path) => PublicKey::from_bytes(&std::fs::read(path)?),
        }
    }
}

/// Replaces `path` with `data`, leaving it owner read-only on Unix.
pub(crate) fn write_secret_file(path: &Path, data: &[u8]) -> Result<(), CryptoError> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o400);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}
