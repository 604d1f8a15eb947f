use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::guard::AuthenticatedSession;
use crate::{AuthError, CredentialRecord, FieldError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "sales_code")]
    pub login_code: String,
    #[serde(default)]
    pub password: SecretString,
}

pub use crate::actions::EnrollCredentialInput as EnrollRequest;

// Response DTOs

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSummary {
    pub id: String,
    pub name: String,
}

/// Public view of a credential. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub login_code: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub is_manager: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerSummary>,
}

impl From<CredentialRecord> for UserSummary {
    fn from(record: CredentialRecord) -> Self {
        Self {
            id: record.id,
            login_code: record.login_code,
            name: record.name,
            email: record.email,
            department: record.department,
            is_manager: record.is_manager,
            manager: record.manager.map(|m| ManagerSummary {
                id: m.id,
                name: m.name,
            }),
        }
    }
}

impl From<&AuthenticatedSession> for UserSummary {
    fn from(session: &AuthenticatedSession) -> Self {
        let user = &session.user;
        Self {
            id: user.subject_id.clone(),
            login_code: user.subject_code.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            is_manager: user.is_manager,
            manager: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserSummary,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserSummary,
    pub session_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledResponse {
    pub id: String,
    pub login_code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CredentialRecord> for EnrolledResponse {
    fn from(record: CredentialRecord) -> Self {
        Self {
            id: record.id,
            login_code: record.login_code,
            name: record.name,
            created_at: record.created_at,
        }
    }
}

// Envelopes

/// `{"status":"success","data":...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub status: String,
    pub data: T,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_owned(),
            data,
        }
    }
}

/// `{"status":"error","error":{"code","message","details"?}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl From<&FieldError> for ErrorDetail {
    fn from(f: &FieldError) -> Self {
        Self {
            field: f.field.clone(),
            message: f.message.clone(),
        }
    }
}

pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::SessionExpired | AuthError::Unauthenticated => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::Conflict(_) => StatusCode::CONFLICT,
        AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthError::PasswordHashError
        | AuthError::StoreError(_)
        | AuthError::ConfigurationError(_)
        | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn code_for(err: &AuthError) -> &'static str {
    match err {
        AuthError::Validation(_) => "VALIDATION_ERROR",
        AuthError::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
        AuthError::SessionExpired => "AUTH_SESSION_EXPIRED",
        AuthError::Unauthenticated => "AUTH_UNAUTHORIZED",
        AuthError::Forbidden => "AUTH_FORBIDDEN",
        AuthError::Conflict(_) => "RESOURCE_CONFLICT",
        AuthError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
        AuthError::PasswordHashError
        | AuthError::StoreError(_)
        | AuthError::ConfigurationError(_)
        | AuthError::Internal(_) => "SERVER_ERROR",
    }
}

impl From<&AuthError> for ErrorEnvelope {
    fn from(err: &AuthError) -> Self {
        let message = if status_for(err).is_server_error() {
            "An internal error occurred".to_owned()
        } else {
            match err {
                AuthError::Validation(_) => "Invalid input".to_owned(),
                other => other.to_string(),
            }
        };
        let details = match err {
            AuthError::Validation(fields) if !fields.is_empty() => {
                Some(fields.iter().map(ErrorDetail::from).collect())
            }
            _ => None,
        };

        Self {
            status: "error".to_owned(),
            error: ErrorBody {
                code: code_for(err).to_owned(),
                message,
                details,
            },
        }
    }
}
