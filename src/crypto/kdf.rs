use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use super::{EncryptionKey, KEY_LEN, SALT_LEN, secure_random};
use crate::codec::{base64_to_bytes, bytes_to_base64, bytes_to_hex, hex_to_bytes};
use crate::error::{CryptoError, Result};

/// Lowest PBKDF2 iteration count accepted.
pub const MIN_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            // PBKDF2-HMAC-SHA256 rounds
            iterations: MIN_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub fn new(iterations: u32) -> Result<Self> {
        let params = Self { iterations };
        params.validate()?;
        Ok(params)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(CryptoError::KeyDerivation(format!(
                "pbkdf2 iterations must be >= {MIN_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        Ok(())
    }
}

/// Per-user salt mixed into key derivation. Not secret.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Generate a fresh random salt.
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        secure_random(&mut salt)?;
        Ok(Self(salt))
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let salt: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::Encoding(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(salt))
    }

    /// Parse a salt as stored server-side: 32 hex characters or base64.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let bytes = if s.len() == SALT_LEN * 2 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            hex_to_bytes(s)?
        } else {
            base64_to_bytes(s)?
        };
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    pub fn to_base64(&self) -> String {
        bytes_to_base64(&self.0)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&self.to_hex()).finish()
    }
}

/// Derive the AES-256 key for `password` and `salt`.
pub fn derive_key(password: &str, salt: &Salt, kdf: KdfParams) -> Result<EncryptionKey> {
    kdf.validate()?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), kdf.iterations, &mut *key);
    debug!(iterations = kdf.iterations, "derived encryption key");

    Ok(EncryptionKey::from_bytes(&key))
}
