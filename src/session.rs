//! Key lifetime for one signed-in user.
//!
//! A `Session` is created at signup or login from the password and the
//! user's salt, lives in memory only, and is dropped on logout.

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, EncryptionKey, KdfParams, Salt};
use crate::entity::{self, DecryptedEntity, Entity};
use crate::error::Result;
use crate::password::validate_password_strength;
use crate::rekey::{self, RekeyProgress};
use crate::sensitive::EntityKind;

pub struct Session {
    key: EncryptionKey,
    salt: Salt,
    kdf: KdfParams,
}

impl Session {
    /// New account: enforce the password policy, generate a salt, derive the key.
    ///
    /// The caller persists [`Session::salt`] server-side.
    pub fn signup(password: Zeroizing<String>, kdf: KdfParams) -> Result<Self> {
        validate_password_strength(&password).into_result()?;
        let salt = Salt::generate()?;
        Self::unlock(password, salt, kdf)
    }

    /// Existing account: derive the key from the password and the stored salt.
    pub fn unlock(password: Zeroizing<String>, salt: Salt, kdf: KdfParams) -> Result<Self> {
        let key = crypto::derive_key(&password, &salt, kdf)?;
        drop(password);
        debug!("session unlocked");

        Ok(Self { key, salt, kdf })
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    pub fn key(&self) -> &EncryptionKey {
        &self.key
    }

    pub fn encrypt(&self, kind: EntityKind, entity: &Entity) -> Result<Entity> {
        entity::encrypt_entity(entity, kind.sensitive_fields(), &self.key)
    }

    pub fn decrypt(&self, kind: EntityKind, entity: &Entity) -> Entity {
        entity::decrypt_entity(entity, kind.sensitive_fields(), &self.key)
    }

    pub fn decrypt_detailed(&self, kind: EntityKind, entity: &Entity) -> DecryptedEntity {
        entity::decrypt_entity_detailed(entity, kind.sensitive_fields(), &self.key)
    }

    pub async fn encrypt_all(
        &self,
        kind: EntityKind,
        entities: Vec<Entity>,
    ) -> Result<Vec<Entity>> {
        entity::encrypt_entities(entities, kind.sensitive_fields(), &self.key).await
    }

    pub async fn decrypt_all(
        &self,
        kind: EntityKind,
        entities: Vec<Entity>,
    ) -> Result<Vec<Entity>> {
        entity::decrypt_entities(entities, kind.sensitive_fields(), &self.key).await
    }

    /// Derive the session for a new password, keeping the salt and KDF params.
    ///
    /// Stored data must then be moved over with [`Session::reencrypt`].
    pub fn change_password(&self, new_password: Zeroizing<String>) -> Result<Session> {
        validate_password_strength(&new_password).into_result()?;
        Session::unlock(new_password, self.salt, self.kdf)
    }

    /// Re-encrypt entities of `kind` from this session's key to `next`'s key.
    pub fn reencrypt<F>(
        &self,
        next: &Session,
        kind: EntityKind,
        entities: &[Entity],
        on_progress: F,
    ) -> Result<Vec<Entity>>
    where
        F: FnMut(RekeyProgress),
    {
        rekey::reencrypt_entities(
            entities,
            kind.sensitive_fields(),
            &self.key,
            &next.key,
            on_progress,
        )
    }

    /// End the session, dropping the key.
    pub fn lock(self) {
        debug!("session locked");
    }
}
