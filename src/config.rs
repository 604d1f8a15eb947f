//! Startup configuration.
//!
//! Configuration is validated once, before the server starts, and yields a
//! typed result instead of failing at first use.
//!
//! # Example
//!
//! ```rust
//! use daily_report_auth::{AppConfig, ConfigError, Environment};
//!
//! let config = AppConfig::from_lookup(|name| match name {
//!     "APP_ENV" => Some("production".to_owned()),
//!     "SESSION_SECRET" => Some("x".repeat(48)),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!(config.environment, Environment::Production);
//! assert!(config.session.cookie_secure);
//!
//! let missing = AppConfig::from_lookup(|name| match name {
//!     "APP_ENV" => Some("production".to_owned()),
//!     _ => None,
//! });
//! assert_eq!(missing.unwrap_err(), ConfigError::MissingSecret);
//! ```

use std::fmt;

use crate::guard::PageGateConfig;
use crate::rate_limit::{ClientIpResolver, ForwardedFor, Limit};
use crate::session::SessionConfig;
use crate::{AuthError, SecretString};

/// Shortest accepted session secret, in characters.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Secret used outside production when none is configured.
pub const DEV_FALLBACK_SECRET: &str = "complex_password_at_least_32_characters_long_for_development";

pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";
pub const ENV_TRUST_PROXY: &str = "TRUST_PROXY";
pub const ENV_TRUST_PROXY_POLICY: &str = "TRUST_PROXY_POLICY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// `production` and `prod` (any case) are production-like; everything
    /// else, including an unset value, is development-like.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No secret configured in a production-like environment.
    MissingSecret,
    /// A configured secret shorter than [`MIN_SECRET_LENGTH`].
    SecretTooShort { length: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecret => write!(
                f,
                "{ENV_SESSION_SECRET} must be set in production (at least {MIN_SECRET_LENGTH} characters)"
            ),
            Self::SecretTooShort { length } => write!(
                f,
                "{ENV_SESSION_SECRET} must be at least {MIN_SECRET_LENGTH} characters long, got {length}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub session: SessionConfig,
    /// Honor `X-Forwarded-For` / `X-Real-IP` when keying the login limiter.
    pub trust_proxy: bool,
    /// Which `X-Forwarded-For` entry is the client: `last` behind a single
    /// reverse proxy, `first` behind a CDN.
    pub forwarded_for: ForwardedFor,
    pub login_limit: Limit,
    pub page_gate: PageGateConfig,
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup.
    ///
    /// # Errors
    ///
    /// `ConfigError::SecretTooShort` for any configured secret under 32
    /// characters, and `ConfigError::MissingSecret` when no secret is
    /// configured in production. An empty value counts as not configured.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup(ENV_APP_ENV).as_deref());
        let secret = resolve_secret(environment, lookup(ENV_SESSION_SECRET))?;
        let trust_proxy = lookup(ENV_TRUST_PROXY).is_some_and(|v| v == "true");
        let forwarded_for = resolve_forwarded_for(lookup(ENV_TRUST_PROXY_POLICY));

        let session = SessionConfig {
            cookie_secure: environment.is_production(),
            secret_key: secret,
            ..SessionConfig::default()
        };

        Ok(Self {
            environment,
            session,
            trust_proxy,
            forwarded_for,
            login_limit: Limit::login(),
            page_gate: PageGateConfig::default(),
        })
    }

    pub fn client_ip_resolver(&self) -> ClientIpResolver {
        ClientIpResolver::new(self.trust_proxy).policy(self.forwarded_for)
    }
}

fn resolve_forwarded_for(configured: Option<String>) -> ForwardedFor {
    match configured.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => ForwardedFor::default(),
        Some(value) => ForwardedFor::parse(value).unwrap_or_else(|| {
            log::warn!(target: "daily_report_auth::config", "msg=\"unrecognized {ENV_TRUST_PROXY_POLICY}, using last\" value=\"{value}\"");
            ForwardedFor::default()
        }),
    }
}

fn resolve_secret(
    environment: Environment,
    configured: Option<String>,
) -> Result<SecretString, ConfigError> {
    match configured.filter(|s| !s.is_empty()) {
        Some(secret) => {
            let secret = SecretString::new(secret);
            let length = secret.char_count();
            if length < MIN_SECRET_LENGTH {
                return Err(ConfigError::SecretTooShort { length });
            }
            Ok(secret)
        }
        None if environment.is_production() => Err(ConfigError::MissingSecret),
        None => {
            log::warn!(target: "daily_report_auth::config", "msg=\"{ENV_SESSION_SECRET} is not set, using the development fallback secret\"");
            Ok(SecretString::new(DEV_FALLBACK_SECRET))
        }
    }
}
