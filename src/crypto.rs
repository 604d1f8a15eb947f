use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;

use crate::{AuthError, SecretString};

// The three Argon2id costs below play the role of a bcrypt cost factor of
// 10-12: fixed at build time, slow enough to make offline guessing expensive.

/// Argon2id memory cost in KiB used for newly created hashes.
pub const MEMORY_COST_KIB: u32 = 19_456;

/// Argon2id iteration count used for newly created hashes.
pub const TIME_COST: u32 = 2;

/// Argon2id lanes used for newly created hashes.
pub const PARALLELISM: u32 = 1;

/// One-way password hashing.
///
/// `hash` salts every call, so hashing the same input twice yields two
/// different strings. `verify` never fails: a hash that cannot be parsed is
/// simply a mismatch.
///
/// # Example
///
/// ```rust
/// use daily_report_auth::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new(1024, 1, 1);
/// let hash = hasher.hash("Password123!").unwrap();
/// assert!(hasher.verify("Password123!", &hash));
/// assert!(!hasher.verify("Password124!", &hash));
/// assert!(!hasher.verify("Password123!", "not-a-phc-string"));
/// ```
pub trait PasswordHasher: Send + Sync {
    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if the configured parameters
    /// are rejected by the algorithm.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id hasher.
///
/// The cost parameters only apply to new hashes; verification reads the
/// parameters embedded in the stored PHC string, so raising the cost does not
/// invalidate existing records.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: MEMORY_COST_KIB,
            time_cost: TIME_COST,
            parallelism: PARALLELISM,
        }
    }
}

impl Argon2Hasher {
    /// Creates a hasher with explicit parameters.
    ///
    /// * `memory_cost` - memory usage in KiB
    /// * `time_cost` - number of iterations
    /// * `parallelism` - number of lanes
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            log::warn!(target: "daily_report_auth", "msg=\"stored password hash is not parseable\"");
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hashes on the blocking pool so the async executor keeps serving other
/// requests while argon2 runs.
///
/// # Errors
///
/// Returns `AuthError::PasswordHashError` if hashing fails and
/// `AuthError::Internal` if the blocking task panicked.
pub async fn hash_off_thread(
    hasher: Arc<dyn PasswordHasher>,
    password: SecretString,
) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
}

/// Verifies on the blocking pool. A failed task counts as a mismatch.
pub async fn verify_off_thread(
    hasher: Arc<dyn PasswordHasher>,
    password: SecretString,
    hash: String,
) -> bool {
    match tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &hash)).await
    {
        Ok(matched) => matched,
        Err(e) => {
            log::error!(target: "daily_report_auth", "msg=\"password verification task failed\" error=\"{e}\"");
            false
        }
    }
}
