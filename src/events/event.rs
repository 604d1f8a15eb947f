use chrono::{DateTime, Utc};

/// Audit events emitted by the login, logout and enrollment flows.
///
/// Dispatching is a no-op until listeners are registered with
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum AuthEvent {
    LoginSucceeded {
        subject_id: String,
        login_code: String,
        client: String,
        at: DateTime<Utc>,
    },
    /// Unknown login code and wrong password share this event. `reason`
    /// tells them apart for the audit trail only.
    LoginFailed {
        login_code: String,
        client: String,
        reason: String,
        at: DateTime<Utc>,
    },
    LoginThrottled {
        client: String,
        retry_after_secs: u64,
        at: DateTime<Utc>,
    },
    LoggedOut {
        subject_id: Option<String>,
        at: DateTime<Utc>,
    },
    CredentialEnrolled {
        subject_id: String,
        login_code: String,
        enrolled_by: String,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "auth.login.success",
            Self::LoginFailed { .. } => "auth.login.failed",
            Self::LoginThrottled { .. } => "auth.login.throttled",
            Self::LoggedOut { .. } => "auth.logout",
            Self::CredentialEnrolled { .. } => "credential.enrolled",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoginThrottled { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::CredentialEnrolled { at, .. } => *at,
        }
    }
}
