use std::sync::Arc;

use chrono::Utc;
use cookie::time::Duration as CookieDuration;
use cookie::Cookie;
use http::header::COOKIE;
use http::HeaderMap;

use super::codec::{AesGcmCodec, SessionCodec};
use super::config::SessionConfig;
use super::{SessionData, SessionUser};
use crate::config::ConfigError;
use crate::AuthError;

/// Creates, validates, refreshes and destroys cookie sessions.
///
/// Persisting a session means producing the `Set-Cookie` value for it: every
/// mutating call returns the [`Cookie`] that the caller must attach to the
/// response.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    codec: Arc<dyn SessionCodec>,
}

impl SessionManager {
    /// Builds a manager sealing cookies with [`AesGcmCodec`].
    ///
    /// # Errors
    ///
    /// Fails when the configured secret is missing or shorter than 32 characters.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let codec = AesGcmCodec::new(&config.secret_key);
        Ok(Self::with_codec(config, Arc::new(codec)))
    }

    pub fn with_codec(config: SessionConfig, codec: Arc<dyn SessionCodec>) -> Self {
        Self {
            config: Arc::new(config),
            codec,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reads the session from the request's `Cookie` headers.
    ///
    /// Never fails: a missing, malformed or tampered cookie is an empty session.
    pub fn get_session(&self, headers: &HeaderMap) -> SessionData {
        self.find_cookie_value(headers)
            .map(|value| self.open_value(&value))
            .unwrap_or_default()
    }

    /// Opens a raw cookie value.
    pub fn open_value(&self, value: &str) -> SessionData {
        match self.codec.open(value) {
            Ok(session) => session,
            Err(e) => {
                log::warn!(target: "daily_report_auth::session", "msg=\"session cookie rejected\" cookie_prefix=\"{}...\" reason=\"{e}\"", value.chars().take(8).collect::<String>());
                SessionData::default()
            }
        }
    }

    pub fn is_valid(&self, session: &SessionData) -> bool {
        session.is_valid_at(now_ms())
    }

    /// Populates `session` from a credential snapshot and starts the timeout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the session cannot be sealed.
    pub fn set_data(
        &self,
        session: &mut SessionData,
        user: SessionUser,
    ) -> Result<Cookie<'static>, AuthError> {
        self.set_data_at(session, user, now_ms())
    }

    pub fn set_data_at(
        &self,
        session: &mut SessionData,
        user: SessionUser,
        now_ms: i64,
    ) -> Result<Cookie<'static>, AuthError> {
        session.populate(user, now_ms + self.timeout_ms());
        self.persist(session)
    }

    /// Extends a valid session. Returns `None`, leaving the session untouched,
    /// when it is not valid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the session cannot be sealed.
    pub fn refresh(&self, session: &mut SessionData) -> Result<Option<Cookie<'static>>, AuthError> {
        self.refresh_at(session, now_ms())
    }

    pub fn refresh_at(
        &self,
        session: &mut SessionData,
        now_ms: i64,
    ) -> Result<Option<Cookie<'static>>, AuthError> {
        if !session.is_valid_at(now_ms) {
            return Ok(None);
        }
        session.expires_at = Some(now_ms + self.timeout_ms());
        self.persist(session).map(Some)
    }

    /// Clears every field, then returns the cookie that removes the session
    /// from the client.
    pub fn destroy(&self, session: &mut SessionData) -> Cookie<'static> {
        session.clear();
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    fn persist(&self, session: &SessionData) -> Result<Cookie<'static>, AuthError> {
        let value = self.codec.seal(session)?;
        let mut cookie = self.base_cookie(value);
        cookie.set_max_age(CookieDuration::seconds(self.config.timeout_secs()));
        Ok(cookie)
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.config.cookie_name.clone(), value))
            .path(self.config.cookie_path.clone())
            .secure(self.config.cookie_secure)
            .http_only(self.config.cookie_http_only)
            .same_site(self.config.cookie_same_site.into())
            .build();

        if let Some(ref domain) = self.config.cookie_domain {
            cookie.set_domain(domain.clone());
        }

        cookie
    }

    fn find_cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.config.cookie_name)
            .map(|c| c.value().to_owned())
    }

    fn timeout_ms(&self) -> i64 {
        self.config.timeout.num_milliseconds()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie_name", &self.config.cookie_name)
            .finish_non_exhaustive()
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
