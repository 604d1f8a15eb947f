use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Emits audit events as `tracing` events. Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuthEvent) {
        tracing::info!(
            target: "daily_report_auth::events",
            event_name = event.name(),
            at = %event.timestamp(),
            ?event,
            "auth event"
        );
    }
}
