//! Byte/string conversions for salts, IVs and ciphertext.
//!
//! Hex is lowercase with two digits per byte. Base64 uses the standard
//! alphabet with padding. Decoding never truncates: malformed input is an
//! [`CryptoError::Encoding`] error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{CryptoError, Result};

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string. Odd length or non-hex characters are rejected.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).map_err(|e| CryptoError::Encoding(format!("invalid hex: {e}")))
}

/// Encode bytes as standard base64.
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a standard base64 string.
pub fn base64_to_bytes(b64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(b64)
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_without_separators() {
        assert_eq!(bytes_to_hex(&[0x00, 0xab, 0x0f, 0xff]), "00ab0fff");
    }

    #[test]
    fn hex_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(hex_to_bytes(&bytes_to_hex(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn hex_accepts_uppercase_input() {
        assert_eq!(hex_to_bytes("ABCD").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn hex_odd_length_fails() {
        assert!(matches!(hex_to_bytes("abc"), Err(CryptoError::Encoding(_))));
    }

    #[test]
    fn hex_non_hex_fails() {
        assert!(matches!(hex_to_bytes("zz"), Err(CryptoError::Encoding(_))));
    }

    #[test]
    fn empty_input_roundtrips() {
        assert_eq!(bytes_to_hex(&[]), "");
        assert!(hex_to_bytes("").unwrap().is_empty());
        assert_eq!(bytes_to_base64(&[]), "");
        assert!(base64_to_bytes("").unwrap().is_empty());
    }

    #[test]
    fn base64_uses_standard_alphabet() {
        assert_eq!(bytes_to_base64(&[0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn base64_roundtrip() {
        let bytes: Vec<u8> = (0..=255).rev().collect();
        assert_eq!(base64_to_bytes(&bytes_to_base64(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn base64_malformed_fails() {
        assert!(matches!(
            base64_to_bytes("not base64!"),
            Err(CryptoError::Encoding(_))
        ));
    }
}
