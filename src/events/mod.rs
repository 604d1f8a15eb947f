//! Audit events for the login lifecycle.
//!
//! Actions always dispatch events. Until listeners are registered they are
//! dropped.
//!
//! ```rust,ignore
//! use daily_report_auth::register_event_listeners;
//! use daily_report_auth::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::AuthEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
