//! BIP39 recovery keys.
//!
//! The mnemonic is shown to the user once. Only its SHA-256 hash is sent to
//! the server, so a later recovery attempt can be checked without the server
//! ever learning the phrase.

use bip39::Mnemonic;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::codec::bytes_to_base64;
use crate::crypto::secure_random;
use crate::error::{CryptoError, Result};

/// 256 bits of entropy, i.e. a 24-word mnemonic.
pub const RECOVERY_ENTROPY_LEN: usize = 32;

/// Generate a new 24-word English recovery mnemonic.
pub fn generate_recovery_key() -> Result<Zeroizing<String>> {
    let mut entropy = [0u8; RECOVERY_ENTROPY_LEN];
    secure_random(&mut entropy)?;

    let mnemonic = Mnemonic::from_entropy(&entropy);
    entropy.zeroize();

    let mnemonic = mnemonic.map_err(|_| CryptoError::InvalidRecoveryKey)?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Parse a mnemonic, checking the word list and checksum.
pub fn parse_recovery_key(mnemonic: &str) -> Result<Mnemonic> {
    mnemonic
        .trim()
        .parse::<Mnemonic>()
        .map_err(|_| CryptoError::InvalidRecoveryKey)
}

pub fn is_valid_recovery_key(mnemonic: &str) -> bool {
    parse_recovery_key(mnemonic).is_ok()
}

/// Base64 SHA-256 of the mnemonic, for server-side storage.
pub fn hash_recovery_key(mnemonic: &str) -> String {
    let digest = Sha256::digest(mnemonic.as_bytes());
    bytes_to_base64(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "abandon abandon abandon abandon abandon abandon \
                         abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_key_has_24_valid_words() {
        let key = generate_recovery_key().unwrap();
        assert_eq!(key.split_whitespace().count(), 24);
        assert!(is_valid_recovery_key(&key));
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate_recovery_key().unwrap();
        let b = generate_recovery_key().unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn known_mnemonic_is_valid() {
        assert!(is_valid_recovery_key(KNOWN));
    }

    #[test]
    fn bad_checksum_is_invalid() {
        let bad = KNOWN.replace("about", "abandon");
        assert!(!is_valid_recovery_key(&bad));
        assert!(matches!(
            parse_recovery_key("not a mnemonic"),
            Err(CryptoError::InvalidRecoveryKey)
        ));
    }

    #[test]
    fn hash_is_deterministic_base64_sha256() {
        let a = hash_recovery_key(KNOWN);
        let b = hash_recovery_key(KNOWN);
        assert_eq!(a, b);
        assert_eq!(a.len(), 44);
        assert_ne!(a, hash_recovery_key("something else"));
    }

    #[test]
    fn empty_hash_matches_sha256_vector() {
        assert_eq!(
            hash_recovery_key(""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }
}
