//! Client-side field-level encryption for personal finance records.
//!
//! Sensitive fields (names, amounts, descriptions) are encrypted with
//! AES-256-GCM under a key derived from the user's password with
//! PBKDF2-HMAC-SHA256, while ids, dates and categories stay readable for the
//! server. Encrypted values travel as `<field>_encrypted` / `<field>_iv`
//! siblings next to the plaintext field during migration.

pub mod codec;
pub mod crypto;
pub mod entity;
mod error;
pub mod field;
pub mod password;
pub mod recovery;
pub mod rekey;
pub mod sensitive;
mod session;

pub use crate::codec::{base64_to_bytes, bytes_to_base64, bytes_to_hex, hex_to_bytes};
pub use crate::crypto::{
    EncryptedPayload, EncryptionKey, KdfParams, Salt, decrypt, derive_key, encrypt,
};
pub use crate::entity::{
    DecryptedEntity, Entity, decrypt_entities, decrypt_entity, decrypt_entity_detailed,
    encrypt_entities, encrypt_entity,
};
pub use crate::error::{CryptoError, Result};
pub use crate::field::{EncryptedField, FieldKind, decrypt_field, encrypt_field};
pub use crate::password::{PasswordStrength, validate_password_strength};
pub use crate::recovery::{generate_recovery_key, hash_recovery_key, is_valid_recovery_key};
pub use crate::rekey::{RekeyPhase, RekeyProgress, reencrypt_entities, reencrypt_entity};
pub use crate::sensitive::EntityKind;
pub use crate::session::Session;

/// Derive a key, encrypt a sample record and decrypt it again.
///
/// Returns `Ok(true)` when the round trip reproduces the record.
pub fn self_test() -> Result<bool> {
    let salt = Salt::generate()?;
    let key = derive_key("TestPassword123!", &salt, KdfParams::default())?;

    let sample = serde_json::json!({
        "income": 50000,
        "expenses": 30000,
        "name": "Test User"
    });
    let payload = encrypt(&sample, &key)?;
    let back: serde_json::Value = decrypt(&payload.ciphertext, &payload.iv, &key)?;

    Ok(back == sample)
}


#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::PASSWORD;

    #[test]
    fn self_test_passes() {
        assert!(self_test().unwrap());
    }

    #[test]
    fn login_flow_with_server_salt_string() {
        // salt as the server hands it back
        let salt_hex = Salt::generate().unwrap().to_hex();

        let salt = Salt::parse(&salt_hex).unwrap();
        let key = derive_key(PASSWORD, &salt, KdfParams::default()).unwrap();
        let fields = EntityKind::Income.sensitive_fields();

        let Value::Object(income) =
            json!({"id": "i1", "name": "Salary", "amount": 3100, "description": "net"})
        else {
            unreachable!()
        };
        let sent = encrypt_entity(&income, fields, &key).unwrap();

        let salt_b64 = salt.to_base64();
        let relogin =
            derive_key(PASSWORD, &Salt::parse(&salt_b64).unwrap(), KdfParams::default()).unwrap();
        assert_eq!(decrypt_entity(&sent, fields, &relogin), income);
    }

    #[test]
    fn different_password_cannot_decrypt() {
        let salt = Salt::from_bytes([9u8; 16]);
        let k1 = derive_key("MyStrongP@ssw0rd", &salt, KdfParams::default()).unwrap();
        let k2 = derive_key("MyStrongP@ssw0rd2", &salt, KdfParams::default()).unwrap();

        let payload = encrypt("secret", &k1).unwrap();
        let res: Result<Value> = decrypt(&payload.ciphertext, &payload.iv, &k2);
        assert!(matches!(res, Err(CryptoError::Decryption)));
    }
}
