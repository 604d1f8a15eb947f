//! Access guards.
//!
//! [`require_authenticated`] and [`require_manager`] gate API calls. They
//! never build responses: a rejection is an [`AuthError`] that the caller
//! turns into the uniform error envelope. [`PageGate`] decides redirects for
//! page navigation before any handler runs.

use chrono::Utc;
use cookie::Cookie;
use http::HeaderMap;

use crate::session::{SessionManager, SessionUser};
use crate::AuthError;

/// A request that passed a guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: SessionUser,
    /// Unix milliseconds, after the refresh.
    pub expires_at: i64,
    /// Cookie carrying the extended expiry. Attach it to the response.
    pub refreshed_cookie: Option<Cookie<'static>>,
}

impl AuthenticatedSession {
    pub fn is_manager(&self) -> bool {
        self.user.is_manager
    }
}

/// Validates the session and extends it.
///
/// # Errors
///
/// `AuthError::Unauthenticated` without a valid session, or
/// `AuthError::Internal` if the refreshed session cannot be sealed.
pub fn require_authenticated(
    sessions: &SessionManager,
    headers: &HeaderMap,
) -> Result<AuthenticatedSession, AuthError> {
    require_authenticated_at(sessions, headers, Utc::now().timestamp_millis())
}

/// [`require_authenticated`] against a fixed clock reading, used for both
/// the validity check and the refresh.
///
/// # Errors
///
/// Same as [`require_authenticated`].
pub fn require_authenticated_at(
    sessions: &SessionManager,
    headers: &HeaderMap,
    now_ms: i64,
) -> Result<AuthenticatedSession, AuthError> {
    let mut session = sessions.get_session(headers);
    if !session.is_valid_at(now_ms) {
        return Err(AuthError::Unauthenticated);
    }

    let Some(refreshed_cookie) = sessions.refresh_at(&mut session, now_ms)? else {
        return Err(AuthError::Unauthenticated);
    };

    match (session.user(), session.expires_at) {
        (Some(user), Some(expires_at)) => Ok(AuthenticatedSession {
            user,
            expires_at,
            refreshed_cookie: Some(refreshed_cookie),
        }),
        _ => Err(AuthError::Unauthenticated),
    }
}

/// [`require_authenticated`] plus the manager role.
///
/// # Errors
///
/// Propagates every [`require_authenticated`] failure and returns
/// `AuthError::Forbidden` for a valid non-manager session.
pub fn require_manager(
    sessions: &SessionManager,
    headers: &HeaderMap,
) -> Result<AuthenticatedSession, AuthError> {
    let authenticated = require_authenticated(sessions, headers)?;
    if !authenticated.is_manager() {
        return Err(AuthError::Forbidden);
    }
    Ok(authenticated)
}

/// Paths used by the page-level redirect gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGateConfig {
    pub login_path: String,
    pub home_path: String,
    pub manager_prefixes: Vec<String>,
    /// Never gated. API routes run their own guards.
    pub ungated_prefixes: Vec<String>,
}

impl Default for PageGateConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_owned(),
            home_path: "/".to_owned(),
            manager_prefixes: vec!["/sales".to_owned()],
            ungated_prefixes: vec![
                "/api".to_owned(),
                "/assets".to_owned(),
                "/favicon.ico".to_owned(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    Allow,
    Redirect(String),
}

#[derive(Debug, Clone, Default)]
pub struct PageGate {
    config: PageGateConfig,
}

impl PageGate {
    pub fn new(config: PageGateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PageGateConfig {
        &self.config
    }

    /// Decides a page request from the path and the caller's session state.
    pub fn decide(&self, path: &str, is_valid: bool, is_manager: bool) -> PageDecision {
        let cfg = &self.config;

        if cfg.ungated_prefixes.iter().any(|p| under_prefix(path, p)) {
            return PageDecision::Allow;
        }

        if path == cfg.login_path {
            return if is_valid {
                PageDecision::Redirect(cfg.home_path.clone())
            } else {
                PageDecision::Allow
            };
        }

        if !is_valid {
            return PageDecision::Redirect(cfg.login_path.clone());
        }

        if !is_manager && cfg.manager_prefixes.iter().any(|p| under_prefix(path, p)) {
            return PageDecision::Redirect(cfg.home_path.clone());
        }

        PageDecision::Allow
    }
}

/// `/sales` covers `/sales` and `/sales/...` but not `/salesforce`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'))
}
