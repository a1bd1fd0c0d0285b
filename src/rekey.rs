//! Re-encryption of stored entities after a password change.
//!
//! A new password yields a new key, so every encrypted field has to be
//! decrypted with the old key and encrypted again with the new one before the
//! old password stops working.

use tracing::{debug, warn};

use crate::crypto::EncryptionKey;
use crate::entity::{Entity, decrypt_entity_detailed, encrypt_entity};
use crate::error::{CryptoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RekeyPhase {
    Decrypting,
    Reencrypting,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RekeyProgress {
    pub phase: RekeyPhase,
    pub current: usize,
    pub total: usize,
}

/// Move one entity from `old_key` to `new_key`.
///
/// Fails with [`CryptoError::Rekey`] if any field cannot be decrypted with the
/// old key. Fields stored without plaintext stay without plaintext.
pub fn reencrypt_entity<S: AsRef<str>>(
    entity: &Entity,
    fields: &[S],
    old_key: &EncryptionKey,
    new_key: &EncryptionKey,
) -> Result<Entity> {
    let decrypted = open_entity(entity, fields, old_key)?;
    let mut reencrypted = encrypt_entity(&decrypted, fields, new_key)?;
    strip_plaintext(&mut reencrypted, entity, fields);
    Ok(reencrypted)
}

/// Re-encrypt a whole collection, reporting progress after each entity.
///
/// Either every entity is re-encrypted or an error is returned; a partial
/// result is never handed back.
pub fn reencrypt_entities<S, F>(
    entities: &[Entity],
    fields: &[S],
    old_key: &EncryptionKey,
    new_key: &EncryptionKey,
    mut on_progress: F,
) -> Result<Vec<Entity>>
where
    S: AsRef<str>,
    F: FnMut(RekeyProgress),
{
    let total = entities.len();
    debug!(total, "re-encrypting entities");

    on_progress(RekeyProgress {
        phase: RekeyPhase::Decrypting,
        current: 0,
        total,
    });
    let mut decrypted = Vec::with_capacity(total);
    for (index, entity) in entities.iter().enumerate() {
        let plain = open_entity(entity, fields, old_key).inspect_err(|e| {
            warn!(index, error = %e, "re-encryption aborted");
        })?;
        decrypted.push(plain);
        on_progress(RekeyProgress {
            phase: RekeyPhase::Decrypting,
            current: index + 1,
            total,
        });
    }

    on_progress(RekeyProgress {
        phase: RekeyPhase::Reencrypting,
        current: 0,
        total,
    });
    let mut out = Vec::with_capacity(total);
    for (index, (plain, original)) in decrypted.iter().zip(entities).enumerate() {
        let mut reencrypted = encrypt_entity(plain, fields, new_key)?;
        strip_plaintext(&mut reencrypted, original, fields);
        out.push(reencrypted);
        on_progress(RekeyProgress {
            phase: RekeyPhase::Reencrypting,
            current: index + 1,
            total,
        });
    }

    on_progress(RekeyProgress {
        phase: RekeyPhase::Complete,
        current: total,
        total,
    });
    Ok(out)
}

fn open_entity<S: AsRef<str>>(
    entity: &Entity,
    fields: &[S],
    old_key: &EncryptionKey,
) -> Result<Entity> {
    let detailed = decrypt_entity_detailed(entity, fields, old_key);
    match detailed.failed_fields.into_iter().next() {
        Some(field) => Err(CryptoError::Rekey { field }),
        None => Ok(detailed.entity),
    }
}

fn strip_plaintext<S: AsRef<str>>(reencrypted: &mut Entity, original: &Entity, fields: &[S]) {
    for field in fields {
        let field = field.as_ref();
        if original.get(field).is_none_or(|v| v.is_null()) {
            reencrypted.remove(field);
        }
    }
}
