//! Entity-level encryption over dynamic JSON records.
//!
//! Each sensitive field `f` gets two siblings, `f_encrypted` and `f_iv`.
//! Encryption keeps the plaintext `f` so older readers keep working while
//! data migrates. Decryption accepts records in any of the three states:
//! plaintext only, ciphertext only, or both.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::crypto::EncryptionKey;
use crate::error::{CryptoError, Result};
use crate::field::{FieldKind, decrypt_field, encrypt_field};

/// A record as exchanged with the API: field name to JSON value.
pub type Entity = Map<String, Value>;

pub const ENCRYPTED_SUFFIX: &str = "_encrypted";
pub const IV_SUFFIX: &str = "_iv";

pub fn encrypted_sibling(field: &str) -> String {
    format!("{field}{ENCRYPTED_SUFFIX}")
}

pub fn iv_sibling(field: &str) -> String {
    format!("{field}{IV_SUFFIX}")
}

/// Result of decrypting an entity, with the fields that could not be decrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct DecryptedEntity {
    pub entity: Entity,
    /// Fields left in their stored form because decryption failed.
    pub failed_fields: Vec<String>,
}

impl DecryptedEntity {
    pub fn is_complete(&self) -> bool {
        self.failed_fields.is_empty()
    }
}

/// Add encrypted siblings for every named field that is present and non-null.
pub fn encrypt_entity<S: AsRef<str>>(
    entity: &Entity,
    fields: &[S],
    key: &EncryptionKey,
) -> Result<Entity> {
    let mut result = entity.clone();

    for field in fields {
        let field = field.as_ref();
        let Some(value) = entity.get(field).filter(|v| !v.is_null()) else {
            continue;
        };

        let encrypted = encrypt_field(value, key)?;
        result.insert(encrypted_sibling(field), Value::String(encrypted.encrypted));
        result.insert(iv_sibling(field), Value::String(encrypted.iv));
    }

    Ok(result)
}

/// Decrypt every named field that carries encrypted siblings.
///
/// Failures are logged and leave the field as stored; see
/// [`decrypt_entity_detailed`] to learn which fields failed.
pub fn decrypt_entity<S: AsRef<str>>(entity: &Entity, fields: &[S], key: &EncryptionKey) -> Entity {
    decrypt_entity_detailed(entity, fields, key).entity
}

pub fn decrypt_entity_detailed<S: AsRef<str>>(
    entity: &Entity,
    fields: &[S],
    key: &EncryptionKey,
) -> DecryptedEntity {
    let mut result = entity.clone();
    let mut failed_fields = Vec::new();

    for field in fields {
        let field = field.as_ref();
        let encrypted_key = encrypted_sibling(field);
        let iv_key = iv_sibling(field);

        let encrypted = entity.get(&encrypted_key).filter(|v| !v.is_null());
        let iv = entity.get(&iv_key).filter(|v| !v.is_null());

        let outcome = match (encrypted, iv) {
            // legacy plaintext
            (None, None) => continue,
            (Some(Value::String(encrypted)), Some(Value::String(iv))) => {
                decrypt_field(encrypted, iv, key, Some(FieldKind::for_field(field)))
            }
            _ => Err(CryptoError::Decryption),
        };

        match outcome {
            Ok(value) => {
                result.insert(field.to_string(), value);
                result.remove(&encrypted_key);
                result.remove(&iv_key);
            }
            Err(e) => {
                warn!(field, error = %e, "failed to decrypt field");
                failed_fields.push(field.to_string());
            }
        }
    }

    DecryptedEntity {
        entity: result,
        failed_fields,
    }
}

/// Encrypt a batch concurrently. Output order matches input order.
///
/// Must be called from within a tokio runtime.
pub async fn encrypt_entities<S: AsRef<str>>(
    entities: Vec<Entity>,
    fields: &[S],
    key: &EncryptionKey,
) -> Result<Vec<Entity>> {
    let results = run_batch(entities, fields, key, |entity, fields, key| {
        encrypt_entity(&entity, fields, key)
    })
    .await?;
    results.into_iter().collect()
}

/// Decrypt a batch concurrently. Output order matches input order.
///
/// Must be called from within a tokio runtime.
pub async fn decrypt_entities<S: AsRef<str>>(
    entities: Vec<Entity>,
    fields: &[S],
    key: &EncryptionKey,
) -> Result<Vec<Entity>> {
    run_batch(entities, fields, key, |entity, fields, key| {
        decrypt_entity(&entity, fields, key)
    })
    .await
}

async fn run_batch<S, T, F>(
    entities: Vec<Entity>,
    fields: &[S],
    key: &EncryptionKey,
    op: F,
) -> Result<Vec<T>>
where
    S: AsRef<str>,
    T: Send + 'static,
    F: Fn(Entity, &[String], &EncryptionKey) -> T + Send + Sync + Copy + 'static,
{
    let fields: Arc<[String]> = fields.iter().map(|f| f.as_ref().to_string()).collect();
    debug!(entities = entities.len(), fields = fields.len(), "running entity batch");

    let handles: Vec<_> = entities
        .into_iter()
        .map(|entity| {
            let fields = Arc::clone(&fields);
            let key = key.clone();
            tokio::task::spawn_blocking(move || op(entity, &fields[..], &key))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.map_err(|e| CryptoError::Worker(e.to_string()))?);
    }
    Ok(results)
}
