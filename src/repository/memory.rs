use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::credential::{CredentialRecord, CredentialRepository, ManagerRef, NewCredential};
use crate::AuthError;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, CredentialRecord>,
    next_id: u64,
}

/// Process-local credential store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCredentialRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |inner| inner.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(
        &self,
        predicate: impl Fn(&CredentialRecord) -> bool,
    ) -> Result<Option<CredentialRecord>, AuthError> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.records.values().find(|r| predicate(r)).cloned())
    }
}

fn lock_error() -> AuthError {
    AuthError::StoreError("credential store lock poisoned".to_owned())
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_login_code(
        &self,
        login_code: &str,
    ) -> Result<Option<CredentialRecord>, AuthError> {
        self.find(|r| r.login_code == login_code)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.records.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        self.find(|r| r.email == email)
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, AuthError> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;

        if inner
            .records
            .values()
            .any(|r| r.login_code == credential.login_code)
        {
            return Err(AuthError::Conflict(
                "This login code is already registered".to_owned(),
            ));
        }
        if inner.records.values().any(|r| r.email == credential.email) {
            return Err(AuthError::Conflict(
                "This email address is already registered".to_owned(),
            ));
        }

        let manager = credential
            .manager_id
            .as_deref()
            .and_then(|id| inner.records.get(id))
            .map(|m| ManagerRef {
                id: m.id.clone(),
                name: m.name.clone(),
            });

        inner.next_id += 1;
        let record = CredentialRecord {
            id: format!("s-{}", inner.next_id),
            login_code: credential.login_code,
            name: credential.name,
            email: credential.email,
            department: credential.department,
            is_manager: credential.is_manager,
            password_hash: credential.password_hash,
            manager,
            created_at: Utc::now(),
        };

        inner.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }
}
