use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{EncryptionKey, IV_LEN, secure_random};
use crate::codec::{base64_to_bytes, bytes_to_base64, bytes_to_hex, hex_to_bytes};
use crate::error::{CryptoError, Result};

/// One encrypted value: base64 ciphertext (tag included) and its hex IV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub iv: String,
}

/// Generate a fresh 12-byte AES-GCM nonce.
pub fn generate_iv() -> Result<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    secure_random(&mut iv)?;
    Ok(iv)
}

/// Serialize `value` to JSON and encrypt it under a newly generated IV.
pub fn encrypt<T: Serialize + ?Sized>(value: &T, key: &EncryptionKey) -> Result<EncryptedPayload> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(value).map_err(|e| CryptoError::Encryption(e.to_string()))?,
    );
    let iv = generate_iv()?;

    let ciphertext = key
        .seal(&iv, &plaintext)
        .map_err(|_| CryptoError::Encryption("AES-GCM seal failed".into()))?;

    Ok(EncryptedPayload {
        ciphertext: bytes_to_base64(&ciphertext),
        iv: bytes_to_hex(&iv),
    })
}

/// Decrypt and deserialize a value produced by [`encrypt`].
///
/// Every failure, from malformed encodings to a tag mismatch, is reported as
/// [`CryptoError::Decryption`].
pub fn decrypt<T: DeserializeOwned>(ciphertext: &str, iv: &str, key: &EncryptionKey) -> Result<T> {
    let ciphertext = base64_to_bytes(ciphertext).map_err(|_| CryptoError::Decryption)?;
    let iv: [u8; IV_LEN] = hex_to_bytes(iv)
        .map_err(|_| CryptoError::Decryption)?
        .try_into()
        .map_err(|_| CryptoError::Decryption)?;

    let plaintext = Zeroizing::new(
        key.open(&iv, &ciphertext)
            .map_err(|_| CryptoError::Decryption)?,
    );
    serde_json::from_slice(&plaintext).map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::crypto::TAG_LEN;
    use crate::test_support::{key, other_key};

    #[test]
    fn roundtrip_json_values() {
        let values = [
            json!("My Salary"),
            json!(50000),
            json!(12.75),
            json!(null),
            json!(true),
            json!({"income": 50000, "expenses": 30000, "name": "Test User"}),
            json!(["a", 1, {"b": false}]),
        ];
        for value in values {
            let payload = encrypt(&value, key()).unwrap();
            let back: Value = decrypt(&payload.ciphertext, &payload.iv, key()).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn same_value_encrypts_differently() {
        let a = encrypt("same", key()).unwrap();
        let b = encrypt("same", key()).unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.iv, b.iv);

        let da: String = decrypt(&a.ciphertext, &a.iv, key()).unwrap();
        let db: String = decrypt(&b.ciphertext, &b.iv, key()).unwrap();
        assert_eq!(da, db);
    }

    #[test]
    fn payload_encodings() {
        let payload = encrypt("x", key()).unwrap();
        assert_eq!(payload.iv.len(), IV_LEN * 2);
        assert!(payload.iv.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // "\"x\"" is three bytes of JSON
        assert_eq!(base64_to_bytes(&payload.ciphertext).unwrap().len(), 3 + TAG_LEN);
    }

    #[test]
    fn wrong_key_fails() {
        let payload = encrypt(&json!({"a": 1}), key()).unwrap();
        let res: Result<Value> = decrypt(&payload.ciphertext, &payload.iv, other_key());
        assert!(matches!(res, Err(CryptoError::Decryption)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let payload = encrypt("amount", key()).unwrap();
        let mut bytes = base64_to_bytes(&payload.ciphertext).unwrap();
        bytes[0] ^= 0x01;
        let tampered = bytes_to_base64(&bytes);

        let res: Result<Value> = decrypt(&tampered, &payload.iv, key());
        assert!(matches!(res, Err(CryptoError::Decryption)));
    }

    #[test]
    fn wrong_iv_fails() {
        let payload = encrypt("amount", key()).unwrap();
        let other = encrypt("amount", key()).unwrap();

        let res: Result<Value> = decrypt(&payload.ciphertext, &other.iv, key());
        assert!(matches!(res, Err(CryptoError::Decryption)));
    }

    #[test]
    fn malformed_inputs_fail_uniformly() {
        let payload = encrypt("amount", key()).unwrap();

        let cases = [
            ("%%%", payload.iv.as_str()),
            (payload.ciphertext.as_str(), "xyz"),
            (payload.ciphertext.as_str(), "00ff"),
            ("", payload.iv.as_str()),
        ];
        for (ciphertext, iv) in cases {
            let res: Result<Value> = decrypt(ciphertext, iv, key());
            assert!(matches!(res, Err(CryptoError::Decryption)));
        }
    }
}
