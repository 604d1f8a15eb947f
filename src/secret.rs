//! Redacting wrapper for passwords and the session secret.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// String that never shows up in `Debug` or `Display` output.
///
/// Login passwords and the session secret travel in this type so that a stray
/// `{:?}` in a log line prints `[REDACTED]` instead of the value. It can be
/// deserialized from a request body but deliberately does not implement
/// `Serialize`.
///
/// ```rust
/// use daily_report_auth::SecretString;
///
/// let password = SecretString::new("Password123!");
/// assert_eq!(format!("{password:?}"), "SecretString([REDACTED])");
/// assert_eq!(password.expose_secret(), "Password123!");
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the wrapped value. Call sites should be limited to hashing,
    /// verification and key derivation.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, which is how secret length rules are stated.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}
