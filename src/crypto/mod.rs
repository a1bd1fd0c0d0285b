//! Cryptographic primitives for field encryption.
//!
//! Provides password-based key derivation, the opaque key handle and the
//! AES-256-GCM value cipher.

pub mod aead;
pub mod kdf;
pub mod key;

pub use aead::{EncryptedPayload, decrypt, encrypt};
pub use kdf::{KdfParams, Salt, derive_key};
pub use key::EncryptionKey;

use getrandom::fill;

use crate::error::{CryptoError, Result};

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the AES-GCM nonce (12 bytes).
pub const IV_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the AES-GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| CryptoError::Random)
}
