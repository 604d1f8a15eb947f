use std::sync::Arc;

use chrono::Utc;
use cookie::Cookie;

use crate::crypto::{verify_off_thread, PasswordHasher};
use crate::events::{dispatch, AuthEvent};
use crate::rate_limit::{RateLimitResult, RateLimiter};
use crate::session::{SessionData, SessionManager};
use crate::{AuthError, CredentialRecord, CredentialRepository, FieldError, SecretString};

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: CredentialRecord,
    pub session: SessionData,
    /// Session cookie to attach to the response.
    pub cookie: Cookie<'static>,
}

/// Login pipeline: field check, throttle, lookup, verify, then session.
///
/// The rate limit is consumed before the credential lookup, so a throttled
/// client is rejected even with the right password. A successful login
/// resets the client's budget.
pub struct LoginAction<C: CredentialRepository> {
    credentials: C,
    limiter: RateLimiter,
    hasher: Arc<dyn PasswordHasher>,
    sessions: SessionManager,
}

impl<C: CredentialRepository> LoginAction<C> {
    pub fn new(
        credentials: C,
        limiter: RateLimiter,
        hasher: Arc<dyn PasswordHasher>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            credentials,
            limiter,
            hasher,
            sessions,
        }
    }

    /// `client` is the rate-limit key, normally the resolved client IP.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` when the login code or password is empty
    /// - `AuthError::RateLimited` when the client's budget is spent
    /// - `AuthError::InvalidCredentials` for an unknown code or a wrong password
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(
        &self,
        login_code: &str,
        password: &SecretString,
        client: &str,
    ) -> Result<LoginOutcome, AuthError> {
        validate_fields(login_code, password)?;

        if let RateLimitResult::Limited { retry_after_secs } = self.limiter.consume(client).await? {
            log::warn!(target: "daily_report_auth", "msg=\"login throttled\" client=\"{client}\" retry_after_secs={retry_after_secs}");
            dispatch(AuthEvent::LoginThrottled {
                client: client.to_owned(),
                retry_after_secs,
                at: Utc::now(),
            })
            .await;
            return Err(AuthError::RateLimited { retry_after_secs });
        }

        let Some(user) = self.credentials.find_by_login_code(login_code).await? else {
            self.reject(login_code, client, "unknown_login_code").await;
            return Err(AuthError::InvalidCredentials);
        };

        let matched = verify_off_thread(
            Arc::clone(&self.hasher),
            password.clone(),
            user.password_hash.clone(),
        )
        .await;
        if !matched {
            self.reject(login_code, client, "password_mismatch").await;
            return Err(AuthError::InvalidCredentials);
        }

        self.limiter.reset(client).await;

        let mut session = SessionData::default();
        let cookie = self.sessions.set_data(&mut session, user.session_user())?;

        log::info!(target: "daily_report_auth", "msg=\"login succeeded\" subject_id=\"{}\" client=\"{client}\"", user.id);
        dispatch(AuthEvent::LoginSucceeded {
            subject_id: user.id.clone(),
            login_code: user.login_code.clone(),
            client: client.to_owned(),
            at: Utc::now(),
        })
        .await;

        Ok(LoginOutcome {
            user,
            session,
            cookie,
        })
    }

    async fn reject(&self, login_code: &str, client: &str, reason: &str) {
        dispatch(AuthEvent::LoginFailed {
            login_code: login_code.to_owned(),
            client: client.to_owned(),
            reason: reason.to_owned(),
            at: Utc::now(),
        })
        .await;
    }
}

fn validate_fields(login_code: &str, password: &SecretString) -> Result<(), AuthError> {
    let mut fields = Vec::new();
    if login_code.is_empty() {
        fields.push(FieldError::new("login_code", "Login code is required"));
    }
    if password.is_empty() {
        fields.push(FieldError::new("password", "Password is required"));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(fields))
    }
}
