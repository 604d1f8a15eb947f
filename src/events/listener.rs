use async_trait::async_trait;

use super::AuthEvent;

/// Receives every dispatched [`AuthEvent`].
///
/// ```rust,ignore
/// use daily_report_auth::events::{AuthEvent, Listener};
/// use async_trait::async_trait;
///
/// struct LockoutAlert;
///
/// #[async_trait]
/// impl Listener for LockoutAlert {
///     async fn handle(&self, event: &AuthEvent) {
///         if let AuthEvent::LoginThrottled { client, .. } = event {
///             // page the on-call rotation
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuthEvent);
}
