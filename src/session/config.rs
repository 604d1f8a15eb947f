use chrono::Duration;

use crate::config::{ConfigError, MIN_SECRET_LENGTH};
use crate::SecretString;

pub const DEFAULT_COOKIE_NAME: &str = "sales_daily_report_session";

/// Idle timeout, also used as the cookie max-age.
pub const SESSION_TIMEOUT_SECONDS: i64 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    #[default]
    Lax,
    Strict,
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::None => Self::None,
            SameSite::Lax => Self::Lax,
            SameSite::Strict => Self::Strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
    pub timeout: Duration,
    pub secret_key: SecretString,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            cookie_path: "/".to_owned(),
            cookie_domain: None,
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
            timeout: Duration::seconds(SESSION_TIMEOUT_SECONDS),
            secret_key: SecretString::default(),
        }
    }
}

impl SessionConfig {
    /// Checks the secret. Length is counted in characters.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingSecret` for an empty secret and
    /// `ConfigError::SecretTooShort` below 32 characters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        let length = self.secret_key.char_count();
        if length < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort { length });
        }
        Ok(())
    }

    pub fn timeout_secs(&self) -> i64 {
        self.timeout.num_seconds()
    }
}
