//! Single-field encryption with number/string awareness.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::crypto::{self, EncryptionKey};
use crate::error::{CryptoError, Result};

/// Type hint for turning a decrypted string back into its original type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
}

impl FieldKind {
    /// Hint derived from the field naming convention: money fields are numeric.
    pub fn for_field(name: &str) -> Self {
        if name.contains("amount") || name == "limit" || name == "planned" {
            FieldKind::Number
        } else {
            FieldKind::Text
        }
    }
}

/// Ciphertext and IV for one field, stored as `<field>_encrypted` / `<field>_iv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    pub encrypted: String,
    pub iv: String,
}

/// Encrypt one field value. Numbers are stringified first.
pub fn encrypt_field(value: &Value, key: &EncryptionKey) -> Result<EncryptedField> {
    let payload = match value {
        Value::Number(n) => crypto::encrypt(&n.to_string(), key)?,
        other => crypto::encrypt(other, key)?,
    };
    Ok(EncryptedField {
        encrypted: payload.ciphertext,
        iv: payload.iv,
    })
}

/// Decrypt one field value.
///
/// With [`FieldKind::Number`] the decrypted string is parsed back into a
/// number. Otherwise the decrypted value is returned unchanged.
pub fn decrypt_field(
    encrypted: &str,
    iv: &str,
    key: &EncryptionKey,
    kind: Option<FieldKind>,
) -> Result<Value> {
    let decrypted: Value = crypto::decrypt(encrypted, iv, key)?;

    match kind {
        Some(FieldKind::Number) => parse_number(&decrypted),
        _ => Ok(decrypted),
    }
}

fn parse_number(value: &Value) -> Result<Value> {
    let parsed = match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => parse_number_text(s.trim()),
        _ => None,
    };
    parsed
        .map(Value::Number)
        .ok_or_else(|| CryptoError::Encoding("decrypted value is not a number".into()))
}

/// JSON number text keeps its exact form (`50000.0` stays a float, large
/// integers stay integers). Looser float text such as `1.` is accepted after.
fn parse_number_text(text: &str) -> Option<Number> {
    serde_json::from_str::<Number>(text)
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
}
