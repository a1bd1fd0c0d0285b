//! Password strength policy applied before any key is derived from a new password.

use serde::Serialize;

use crate::error::{CryptoError, Result};

pub const MIN_PASSWORD_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl PasswordStrength {
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(CryptoError::Validation(self.errors))
        }
    }
}

/// Check every rule and report all violations.
pub fn validate_password_strength(password: &str) -> PasswordStrength {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain lowercase letters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain uppercase letters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain numbers".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Password must contain special characters".to_string());
    }

    PasswordStrength {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(strength: &PasswordStrength, needle: &str) -> bool {
        strength.errors.iter().any(|e| e.contains(needle))
    }

    #[test]
    fn short_password_reports_length() {
        let s = validate_password_strength("Short1!");
        assert!(!s.valid);
        assert!(has_error(&s, "at least 12 characters"));
        assert_eq!(s.errors.len(), 1);
    }

    #[test]
    fn missing_uppercase() {
        let s = validate_password_strength("lowercase123!");
        assert!(!s.valid);
        assert!(has_error(&s, "uppercase"));
    }

    #[test]
    fn missing_special_character() {
        let s = validate_password_strength("NoSpecialChar123");
        assert!(!s.valid);
        assert!(has_error(&s, "special characters"));
        assert_eq!(s.errors.len(), 1);
    }

    #[test]
    fn strong_password_is_valid() {
        let s = validate_password_strength("MyStrongP@ssw0rd");
        assert!(s.valid);
        assert!(s.errors.is_empty());
        assert!(s.into_result().is_ok());
    }

    #[test]
    fn empty_password_reports_every_rule() {
        let s = validate_password_strength("");
        assert_eq!(s.errors.len(), 5);
    }

    #[test]
    fn non_ascii_counts_as_special() {
        let s = validate_password_strength("Passwörd12345");
        assert!(s.valid, "{:?}", s.errors);
    }

    #[test]
    fn into_result_carries_reasons() {
        match validate_password_strength("abc").into_result() {
            Err(CryptoError::Validation(reasons)) => assert_eq!(reasons.len(), 4),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }
}
