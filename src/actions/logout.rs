use chrono::Utc;
use cookie::Cookie;

use crate::events::{dispatch, AuthEvent};
use crate::session::{SessionData, SessionManager};

/// Ends the caller's session. Succeeds whether or not a session existed.
pub struct LogoutAction {
    sessions: SessionManager,
}

impl LogoutAction {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Returns the removal cookie for the response.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all))]
    pub async fn execute(&self, session: &mut SessionData) -> Cookie<'static> {
        let subject_id = session.subject_id.clone();
        let cookie = self.sessions.destroy(session);

        log::info!(target: "daily_report_auth", "msg=\"logged out\" subject_id=\"{}\"", subject_id.as_deref().unwrap_or("-"));
        dispatch(AuthEvent::LoggedOut {
            subject_id,
            at: Utc::now(),
        })
        .await;

        cookie
    }
}
