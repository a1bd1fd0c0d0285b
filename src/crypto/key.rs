//! Opaque handle to a derived AES-256-GCM key.

use std::fmt;
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use super::{IV_LEN, KEY_LEN};

/// A derived key usable only for encrypting and decrypting.
///
/// Raw key bytes are never exposed. Clones share the same cipher state.
/// The expanded AES round keys are zeroized when the last clone is dropped
/// (`aes` is built with its `zeroize` feature).
#[derive(Clone)]
pub struct EncryptionKey {
    cipher: Arc<Aes256Gcm>,
}

impl EncryptionKey {
    pub(crate) fn from_bytes(bytes: &[u8; KEY_LEN]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(bytes));
        Self {
            cipher: Arc::new(cipher),
        }
    }

    pub(crate) fn seal(
        &self,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        self.cipher.encrypt(Nonce::from_slice(iv), plaintext)
    }

    pub(crate) fn open(
        &self,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        self.cipher.decrypt(Nonce::from_slice(iv), ciphertext)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}
