//! Session and login lifecycle for the sales daily-report application.
//!
//! The crate covers the parts of the application that gate access:
//!
//! - [`crypto`]: slow salted password hashing and verification
//! - [`validators`]: password strength policy and enrollment field checks
//! - [`rate_limit`]: per-client login throttling with lockout
//! - [`session`]: encrypted cookie sessions (the cookie is the only session state)
//! - [`guard`]: authenticated / manager guards and the page-level redirect gate
//! - [`api`]: response envelopes and, with `axum_api`, the HTTP endpoints
//!
//! Credential records live in an external store reached through
//! [`CredentialRepository`].

pub mod actions;
pub mod api;
pub mod config;
pub mod crypto;
pub mod events;
pub mod guard;
pub mod rate_limit;
pub mod repository;
pub mod session;
pub mod validators;

mod secret;

use std::fmt;

use serde::Serialize;

pub use config::{AppConfig, ConfigError, Environment};
pub use events::register_event_listeners;
pub use repository::{
    CredentialRecord, CredentialRepository, InMemoryCredentialRepository, ManagerRef,
    NewCredential,
};
pub use secret::SecretString;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Malformed or missing input.
    Validation(Vec<FieldError>),
    /// Unknown login code or wrong password. Both cases share this variant.
    InvalidCredentials,
    /// Session check found no valid session.
    SessionExpired,
    /// A guarded endpoint was called without a valid session.
    Unauthenticated,
    /// Authenticated, but the role is insufficient.
    Forbidden,
    /// Uniqueness violation in the credential store.
    Conflict(String),
    RateLimited {
        retry_after_secs: u64,
    },
    PasswordHashError,
    StoreError(String),
    ConfigurationError(String),
    Internal(String),
}

impl AuthError {
    /// Shorthand for a validation error on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(fields) => match fields.as_slice() {
                [] => write!(f, "Invalid input"),
                [only] => write!(f, "Invalid input: {}", only.message),
                _ => write!(f, "Invalid input ({} fields)", fields.len()),
            },
            Self::InvalidCredentials => write!(f, "Invalid login code or password"),
            Self::SessionExpired => write!(f, "Session is invalid or has expired"),
            Self::Unauthenticated => write!(f, "Authentication required"),
            Self::Forbidden => write!(f, "You do not have permission to access this resource"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::RateLimited { retry_after_secs } => write!(
                f,
                "Too many login attempts. Please try again in {retry_after_secs} seconds."
            ),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::StoreError(msg) => write!(f, "Store error: {msg}"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}
