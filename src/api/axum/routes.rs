use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::middleware::persist_refreshed_session;
use crate::config::{AppConfig, ConfigError};
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::guard::PageGate;
use crate::rate_limit::{ClientIpResolver, RateLimiter};
use crate::session::SessionManager;
use crate::CredentialRepository;

#[derive(Clone)]
pub struct AppState<C> {
    pub credentials: C,
    pub sessions: SessionManager,
    pub limiter: RateLimiter,
    pub hasher: Arc<dyn PasswordHasher>,
    pub client_ip: ClientIpResolver,
    pub page_gate: PageGate,
}

impl<C: CredentialRepository> AppState<C> {
    /// In-memory login limiter and the default argon2 cost.
    ///
    /// # Errors
    ///
    /// Fails when the session secret is unusable.
    pub fn from_config(config: &AppConfig, credentials: C) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials,
            sessions: SessionManager::new(config.session.clone())?,
            limiter: RateLimiter::in_memory(config.login_limit.clone()),
            hasher: Arc::new(Argon2Hasher::default()),
            client_ip: config.client_ip_resolver(),
            page_gate: PageGate::new(config.page_gate.clone()),
        })
    }

    #[must_use]
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }
}

/// Login, logout, session check and credential enrollment.
///
/// Mount under `/api`. Routes added to the returned router afterwards are
/// outside its [`persist_refreshed_session`] layer.
pub fn api_routes<C>() -> Router<AppState<C>>
where
    C: CredentialRepository + Clone + 'static,
{
    Router::new()
        .route("/auth/login", post(handlers::login::<C>))
        .route("/auth/logout", post(handlers::logout::<C>))
        .route("/auth/session", get(handlers::session_check::<C>))
        .route("/sales", post(handlers::enroll::<C>))
        .layer(from_fn(persist_refreshed_session))
}
