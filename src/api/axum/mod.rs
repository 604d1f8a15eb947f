mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{page_gate, persist_refreshed_session, Authenticated, Manager};
pub use routes::{api_routes, AppState};
