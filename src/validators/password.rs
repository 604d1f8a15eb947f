use serde::{Deserialize, Serialize};

use super::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Characters that satisfy the special-character rule.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Password strength rules applied when a credential is enrolled.
///
/// Unlike a first-failure validator, [`PasswordPolicy::validate`] reports
/// every rule the password breaks, in a fixed order: length, uppercase,
/// lowercase, digit, special character.
///
/// ```
/// use daily_report_auth::validators::PasswordPolicy;
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("Password123!").valid);
///
/// let result = policy.validate("pass");
/// assert!(!result.valid);
/// assert_eq!(result.errors.len(), 4);
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// Outcome of [`PasswordPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordValidation {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl PasswordValidation {
    /// Human readable messages, one per broken rule.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum password length.
    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    pub fn validate(&self, password: &str) -> PasswordValidation {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(ValidationError::PasswordTooShort(self.min_length));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(ValidationError::PasswordMissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(ValidationError::PasswordMissingLowercase);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::PasswordMissingDigit);
        }

        if self.require_special && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            errors.push(ValidationError::PasswordMissingSpecial);
        }

        PasswordValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}
