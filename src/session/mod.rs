//! Cookie-carried sessions.
//!
//! There is no server-side session table. The whole session is sealed into
//! the cookie value by a [`SessionCodec`] and opened again on every request.

mod codec;
mod config;
mod manager;

pub use codec::{AesGcmCodec, SessionCodec};
pub use config::{SameSite, SessionConfig, DEFAULT_COOKIE_NAME, SESSION_TIMEOUT_SECONDS};
pub use manager::SessionManager;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential snapshot copied into a session at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub subject_id: String,
    pub subject_code: String,
    pub display_name: String,
    pub email: String,
    pub department: String,
    pub is_manager: bool,
}

/// Session state as carried by the cookie.
///
/// Every field is optional because an absent, expired or destroyed session is
/// represented by the same type. Use [`SessionData::is_valid_at`] or
/// [`SessionManager::is_valid`] before trusting any of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_manager: Option<bool>,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl SessionData {
    /// Valid iff a subject is present and `expires_at` is strictly after `now_ms`.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        match (&self.subject_id, self.expires_at) {
            (Some(id), Some(expires_at)) => !id.is_empty() && expires_at > now_ms,
            _ => false,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.is_manager.unwrap_or(false)
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(DateTime::from_timestamp_millis)
    }

    /// Snapshot of the subject, if the session carries one.
    pub fn user(&self) -> Option<SessionUser> {
        Some(SessionUser {
            subject_id: self.subject_id.clone()?,
            subject_code: self.subject_code.clone().unwrap_or_default(),
            display_name: self.display_name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            department: self.department.clone().unwrap_or_default(),
            is_manager: self.is_manager(),
        })
    }

    pub(crate) fn populate(&mut self, user: SessionUser, expires_at: i64) {
        self.subject_id = Some(user.subject_id);
        self.subject_code = Some(user.subject_code);
        self.display_name = Some(user.display_name);
        self.email = Some(user.email);
        self.department = Some(user.department);
        self.is_manager = Some(user.is_manager);
        self.expires_at = Some(expires_at);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
