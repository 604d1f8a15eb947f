use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::crypto::{hash_off_thread, PasswordHasher};
use crate::events::{dispatch, AuthEvent};
use crate::validators::{
    validate_department, validate_email, validate_login_code, validate_name, PasswordPolicy,
};
use crate::{
    AuthError, CredentialRecord, CredentialRepository, FieldError, NewCredential, SecretString,
};

/// Fields of a new sales representative.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollCredentialInput {
    #[serde(default, alias = "sales_code")]
    pub login_code: String,
    #[serde(default, alias = "sales_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub password: SecretString,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub manager_id: Option<String>,
}

/// Creates a credential on behalf of a manager.
pub struct EnrollCredentialAction<C: CredentialRepository> {
    credentials: C,
    hasher: Arc<dyn PasswordHasher>,
    policy: PasswordPolicy,
}

impl<C: CredentialRepository> EnrollCredentialAction<C> {
    pub fn new(credentials: C, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self::with_policy(credentials, hasher, PasswordPolicy::default())
    }

    pub fn with_policy(credentials: C, hasher: Arc<dyn PasswordHasher>, policy: PasswordPolicy) -> Self {
        Self {
            credentials,
            hasher,
            policy,
        }
    }

    /// # Errors
    ///
    /// - `AuthError::Validation` listing every invalid field, or naming
    ///   `manager_id` when it does not reference an existing manager
    /// - `AuthError::Conflict` when the login code or email is taken
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "enroll_credential", skip_all, err)
    )]
    pub async fn execute(
        &self,
        input: EnrollCredentialInput,
        enrolled_by: &str,
    ) -> Result<CredentialRecord, AuthError> {
        let input = EnrollCredentialInput {
            login_code: input.login_code.trim().to_owned(),
            name: input.name.trim().to_owned(),
            email: input.email.trim().to_owned(),
            department: input.department.trim().to_owned(),
            manager_id: input.manager_id.filter(|id| !id.trim().is_empty()),
            ..input
        };

        self.validate(&input)?;

        if self
            .credentials
            .find_by_login_code(&input.login_code)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(
                "This login code is already registered".to_owned(),
            ));
        }
        if self.credentials.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::Conflict(
                "This email address is already registered".to_owned(),
            ));
        }

        if let Some(manager_id) = input.manager_id.as_deref() {
            match self.credentials.find_by_id(manager_id).await? {
                None => return Err(AuthError::field("manager_id", "Manager not found")),
                Some(m) if !m.is_manager => {
                    return Err(AuthError::field(
                        "manager_id",
                        "The referenced account is not a manager",
                    ))
                }
                Some(_) => {}
            }
        }

        let password_hash = hash_off_thread(Arc::clone(&self.hasher), input.password).await?;

        let record = self
            .credentials
            .insert(NewCredential {
                login_code: input.login_code,
                name: input.name,
                email: input.email,
                department: input.department,
                is_manager: input.is_manager,
                password_hash,
                manager_id: input.manager_id,
            })
            .await?;

        log::info!(target: "daily_report_auth", "msg=\"credential enrolled\" subject_id=\"{}\" enrolled_by=\"{enrolled_by}\"", record.id);
        dispatch(AuthEvent::CredentialEnrolled {
            subject_id: record.id.clone(),
            login_code: record.login_code.clone(),
            enrolled_by: enrolled_by.to_owned(),
            at: Utc::now(),
        })
        .await;

        Ok(record)
    }

    fn validate(&self, input: &EnrollCredentialInput) -> Result<(), AuthError> {
        let mut fields = Vec::new();

        if let Err(e) = validate_login_code(&input.login_code) {
            fields.push(FieldError::new("login_code", e.to_string()));
        }
        if let Err(e) = validate_name(&input.name) {
            fields.push(FieldError::new("name", e.to_string()));
        }
        if let Err(e) = validate_email(&input.email) {
            fields.push(FieldError::new("email", e.to_string()));
        }
        if let Err(e) = validate_department(&input.department) {
            fields.push(FieldError::new("department", e.to_string()));
        }
        fields.extend(
            self.policy
                .validate(input.password.expose_secret())
                .messages()
                .into_iter()
                .map(|m| FieldError::new("password", m)),
        );

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Argon2Hasher;
    use crate::InMemoryCredentialRepository;

    fn hasher() -> Arc<dyn PasswordHasher> {
        Arc::new(Argon2Hasher::new(1024, 1, 1))
    }

    fn input(code: &str, email: &str) -> EnrollCredentialInput {
        EnrollCredentialInput {
            login_code: code.to_owned(),
            name: "Sato".to_owned(),
            email: email.to_owned(),
            department: "Sales 2".to_owned(),
            password: SecretString::new("Password123!"),
            is_manager: false,
            manager_id: None,
        }
    }

    #[tokio::test]
    async fn test_enroll_hashes_password() {
        let repo = InMemoryCredentialRepository::new();
        let hasher = hasher();
        let action = EnrollCredentialAction::new(repo.clone(), Arc::clone(&hasher));

        let record = action
            .execute(input("S0002", "sato@example.com"), "s-admin")
            .await
            .unwrap();

        assert_eq!(record.login_code, "S0002");
        assert_ne!(record.password_hash, "Password123!");
        assert!(hasher.verify("Password123!", &record.password_hash));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_collects_every_field_error() {
        let action = EnrollCredentialAction::new(InMemoryCredentialRepository::new(), hasher());
        let bad = EnrollCredentialInput {
            login_code: "S-02".to_owned(),
            name: String::new(),
            email: "nope".to_owned(),
            department: String::new(),
            password: SecretString::new("pass"),
            is_manager: false,
            manager_id: None,
        };

        let AuthError::Validation(fields) = action.execute(bad, "s-admin").await.unwrap_err() else {
            panic!("expected a validation error");
        };

        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "login_code",
                "name",
                "email",
                "department",
                "password",
                "password",
                "password",
                "password"
            ]
        );
        assert_eq!(fields[4].message, "Password must be at least 10 characters");
    }

    #[tokio::test]
    async fn test_enroll_conflicts() {
        let repo = InMemoryCredentialRepository::new();
        let action = EnrollCredentialAction::new(repo, hasher());
        action
            .execute(input("S0002", "sato@example.com"), "s-admin")
            .await
            .unwrap();

        let code_taken = action
            .execute(input("S0002", "other@example.com"), "s-admin")
            .await
            .unwrap_err();
        assert_eq!(
            code_taken,
            AuthError::Conflict("This login code is already registered".to_owned())
        );

        let email_taken = action
            .execute(input("S0003", "sato@example.com"), "s-admin")
            .await
            .unwrap_err();
        assert_eq!(
            email_taken,
            AuthError::Conflict("This email address is already registered".to_owned())
        );
    }

    #[tokio::test]
    async fn test_enroll_checks_manager_reference() {
        let repo = InMemoryCredentialRepository::new();
        let action = EnrollCredentialAction::new(repo, hasher());
        let rep = action
            .execute(input("S0002", "sato@example.com"), "s-admin")
            .await
            .unwrap();

        let mut missing = input("S0003", "kato@example.com");
        missing.manager_id = Some("s-404".to_owned());
        assert_eq!(
            action.execute(missing, "s-admin").await.unwrap_err(),
            AuthError::field("manager_id", "Manager not found")
        );

        let mut not_manager = input("S0003", "kato@example.com");
        not_manager.manager_id = Some(rep.id);
        assert_eq!(
            action.execute(not_manager, "s-admin").await.unwrap_err(),
            AuthError::field("manager_id", "The referenced account is not a manager")
        );
    }

    #[tokio::test]
    async fn test_enroll_links_manager() {
        let repo = InMemoryCredentialRepository::new();
        let action = EnrollCredentialAction::new(repo, hasher());
        let mut boss = input("M0001", "boss@example.com");
        boss.is_manager = true;
        let boss = action.execute(boss, "s-admin").await.unwrap();

        let mut rep = input("S0002", "sato@example.com");
        rep.manager_id = Some(boss.id.clone());
        let rep = action.execute(rep, "s-admin").await.unwrap();

        assert_eq!(rep.manager.map(|m| m.id), Some(boss.id));
    }

    #[test]
    fn test_input_accepts_original_field_names() {
        let input: EnrollCredentialInput = serde_json::from_str(
            r#"{"sales_code":"S0009","sales_name":"Ito","email":"ito@example.com","department":"Sales 3","password":"Password123!"}"#,
        )
        .unwrap();
        assert_eq!(input.login_code, "S0009");
        assert_eq!(input.name, "Ito");
        assert!(!input.is_manager);
    }
}
