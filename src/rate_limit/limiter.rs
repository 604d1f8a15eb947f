use std::sync::Arc;

use super::limit::Limit;
use super::store::{InMemoryStore, RateLimitResult, RateLimitStore};
use crate::AuthError;

/// Login throttle keyed by client identifier.
///
/// # Example
///
/// ```rust
/// use daily_report_auth::rate_limit::{Limit, RateLimiter};
///
/// # async fn run() {
/// let limiter = RateLimiter::in_memory(Limit::login());
///
/// let result = limiter.consume("203.0.113.7").await.unwrap();
/// assert!(result.is_allowed());
///
/// limiter.reset("203.0.113.7").await;
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory(limit: Limit) -> Self {
        Self::new(Arc::new(InMemoryStore::new(limit)))
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Spends one attempt for `key`.
    ///
    /// # Errors
    ///
    /// Store failures are logged and propagated.
    pub async fn consume(&self, key: &str) -> Result<RateLimitResult, AuthError> {
        self.store.consume(key).await.inspect_err(|e| {
            log::error!(target: "daily_report_auth::rate_limit", "msg=\"rate limit consume failed\" key=\"{key}\" error=\"{e}\"");
        })
    }

    /// Clears `key`. Failures are logged and swallowed so that a successful
    /// login always completes.
    pub async fn reset(&self, key: &str) {
        if let Err(e) = self.store.reset(key).await {
            log::error!(target: "daily_report_auth::rate_limit", "msg=\"failed to reset rate limit\" key=\"{key}\" error=\"{e}\"");
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
