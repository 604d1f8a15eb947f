use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::limit::Limit;
use crate::AuthError;

/// Counter state for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub attempts: u32,
    pub window_ends_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    /// An entry is live while its block or its window is still running.
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.blocked_until {
            Some(until) => until > now,
            None => self.window_ends_at > now,
        }
    }
}

/// Result of a single `consume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Limited { retry_after_secs } => Some(*retry_after_secs),
            Self::Allowed { .. } => None,
        }
    }
}

/// Storage for attempt counters.
///
/// Each store is built with its [`Limit`]. Implementations must make
/// `consume` atomic per key: two concurrent calls may never both take the
/// last remaining point.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Spends one attempt for `key`, creating the entry on first use.
    async fn consume(&self, key: &str) -> Result<RateLimitResult, AuthError>;

    /// Drops the entry for `key` so the next `consume` starts fresh.
    async fn reset(&self, key: &str) -> Result<(), AuthError>;
}

/// Process-local store. A multi-node deployment needs a shared store behind
/// the same trait.
#[derive(Debug)]
pub struct InMemoryStore {
    limit: Limit,
    entries: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(limit: Limit) -> Self {
        Self {
            limit,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn limit(&self) -> &Limit {
        &self.limit
    }

    /// Consume at an explicit instant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreError` if the lock is poisoned.
    #[allow(clippy::significant_drop_tightening)]
    pub fn consume_at(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitResult, AuthError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthError::StoreError("rate limit lock poisoned".to_owned()))?;

        if let Some(info) = entries.get(key) {
            if let Some(until) = info.blocked_until.filter(|until| *until > now) {
                return Ok(RateLimitResult::Limited {
                    retry_after_secs: ceil_secs(until - now),
                });
            }
            if !info.is_live(now) {
                entries.remove(key);
            }
        }

        let info = entries
            .entry(key.to_owned())
            .or_insert_with(|| RateLimitInfo {
                attempts: 0,
                window_ends_at: now + self.limit.window,
                blocked_until: None,
            });

        info.attempts += 1;
        if info.attempts >= self.limit.points {
            info.blocked_until = Some(now + self.limit.block);
        }

        Ok(RateLimitResult::Allowed {
            remaining: self.limit.points.saturating_sub(info.attempts),
        })
    }

    /// Current entry for `key`, if any.
    pub fn get(&self, key: &str) -> Option<RateLimitInfo> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call periodically in long-running processes to drop entries whose
    /// window and block have both elapsed.
    pub fn cleanup_expired(&self) {
        self.cleanup_expired_at(Utc::now());
    }

    pub fn cleanup_expired_at(&self, now: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, info| info.is_live(now));
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Limit::login())
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn consume(&self, key: &str) -> Result<RateLimitResult, AuthError> {
        self.consume_at(key, Utc::now())
    }

    async fn reset(&self, key: &str) -> Result<(), AuthError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthError::StoreError("rate limit lock poisoned".to_owned()))?;

        entries.remove(key);
        Ok(())
    }
}

/// Whole seconds until `remaining` has passed, rounded up and never zero.
fn ceil_secs(remaining: chrono::Duration) -> u64 {
    let millis = u64::try_from(remaining.num_milliseconds()).unwrap_or(0);
    millis.div_ceil(1000).max(1)
}
