use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionUser;
use crate::AuthError;

/// Manager assigned to a sales representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    pub id: String,
    pub name: String,
}

/// A stored login identity. `login_code` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: String,
    pub login_code: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub is_manager: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub manager: Option<ManagerRef>,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Snapshot copied into the session at login.
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            subject_id: self.id.clone(),
            subject_code: self.login_code.clone(),
            display_name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            is_manager: self.is_manager,
        }
    }
}

/// Fields for a new credential. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub login_code: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub is_manager: bool,
    pub password_hash: String,
    pub manager_id: Option<String>,
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_login_code(&self, login_code: &str)
        -> Result<Option<CredentialRecord>, AuthError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError>;

    /// Stores a new credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` when the login code or email is taken.
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, AuthError>;
}
