use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Deliberately carries no detail: a wrong key and tampered data look the same.
    #[error("Decryption failed. Incorrect password or corrupted data.")]
    Decryption,

    #[error("invalid encoding: {0}")]
    Encoding(String),

    #[error("password does not meet strength requirements: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("OS random generator unavailable")]
    Random,

    #[error("invalid recovery key")]
    InvalidRecoveryKey,

    #[error("re-encryption aborted: field '{field}' could not be decrypted with the old key")]
    Rekey { field: String },

    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),

    #[error("worker task failed: {0}")]
    Worker(String),
}

pub type Result<T, E = CryptoError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_reason() {
        let err = CryptoError::Validation(vec!["too short".into(), "needs digits".into()]);
        assert_eq!(
            err.to_string(),
            "password does not meet strength requirements: too short; needs digits"
        );
    }

    #[test]
    fn decryption_error_is_uniform() {
        assert_eq!(
            CryptoError::Decryption.to_string(),
            "Decryption failed. Incorrect password or corrupted data."
        );
    }
}
