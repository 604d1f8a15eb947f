use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Writes audit events through `log`.
///
/// Failed and throttled logins go out at `warn`; everything else uses the
/// configured level.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }

    fn level_for(&self, event: &AuthEvent) -> log::Level {
        match event {
            AuthEvent::LoginFailed { .. } | AuthEvent::LoginThrottled { .. } => log::Level::Warn,
            _ => self.level,
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AuthEvent) {
        log::log!(
            target: "daily_report_auth::events",
            self.level_for(event),
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(LoggingListener::default().level, log::Level::Info);
    }

    #[test]
    fn test_failures_escalate_to_warn() {
        let listener = LoggingListener::with_level(log::Level::Debug);
        let failed = AuthEvent::LoginFailed {
            login_code: "S0001".to_owned(),
            client: "unknown".to_owned(),
            reason: "password_mismatch".to_owned(),
            at: Utc::now(),
        };
        let logged_out = AuthEvent::LoggedOut {
            subject_id: None,
            at: Utc::now(),
        };

        assert_eq!(listener.level_for(&failed), log::Level::Warn);
        assert_eq!(listener.level_for(&logged_out), log::Level::Debug);
    }

    #[tokio::test]
    async fn test_handle() {
        let listener = LoggingListener::new();
        listener
            .handle(&AuthEvent::LoginThrottled {
                client: "203.0.113.7".to_owned(),
                retry_after_secs: 42,
                at: Utc::now(),
            })
            .await;
    }
}
