#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

//! Session Server Example
//!
//! Serves the login endpoints under `/api` and a small gated page area.
//! Two accounts are seeded: manager `M0001` and representative `S0001`, both
//! with password `Password123!`.
//!
//! Run with: `cargo run --example session_server`
//!
//! Environment variables (a `.env` file is read too):
//!   APP_ENV=production        (optional, requires SESSION_SECRET)
//!   SESSION_SECRET=...        (at least 32 characters)
//!   TRUST_PROXY=true          (optional, key the limiter on X-Forwarded-For)
//!   TRUST_PROXY_POLICY=first  (optional, `last` by default)
//!   RUST_LOG=info
//!
//! Test endpoints:
//!   curl -i -X POST http://localhost:8080/api/auth/login \
//!     -H "Content-Type: application/json" \
//!     -d '{"login_code": "S0001", "password": "Password123!"}'

use std::sync::Arc;
use std::time::Duration;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use daily_report_auth::api::axum::{api_routes, page_gate, persist_refreshed_session, AppState};
use daily_report_auth::crypto::PasswordHasher;
use daily_report_auth::events::listeners::LoggingListener;
use daily_report_auth::rate_limit::{InMemoryStore, RateLimiter};
use daily_report_auth::{
    register_event_listeners, AppConfig, CredentialRepository, InMemoryCredentialRepository,
    NewCredential,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

type Repo = InMemoryCredentialRepository;

async fn seed(state: &AppState<Repo>) {
    let hash = state.hasher.hash("Password123!").expect("Failed to hash seed password");

    let manager = state
        .credentials
        .insert(NewCredential {
            login_code: "M0001".to_string(),
            name: "Yamada Taro".to_string(),
            email: "yamada@example.com".to_string(),
            department: "Sales HQ".to_string(),
            is_manager: true,
            password_hash: hash.clone(),
            manager_id: None,
        })
        .await
        .expect("Failed to seed manager");

    state
        .credentials
        .insert(NewCredential {
            login_code: "S0001".to_string(),
            name: "Tanaka Hanako".to_string(),
            email: "tanaka@example.com".to_string(),
            department: "Sales 1".to_string(),
            is_manager: false,
            password_hash: hash,
            manager_id: Some(manager.id),
        })
        .await
        .expect("Failed to seed representative");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    register_event_listeners(|registry| {
        registry.listen(LoggingListener::new());
    });

    let config = AppConfig::from_env().expect("Invalid configuration");

    let store = Arc::new(InMemoryStore::new(config.login_limit.clone()));
    let state = AppState::from_config(&config, InMemoryCredentialRepository::new())
        .expect("Invalid session configuration")
        .with_limiter(RateLimiter::new(store.clone()));

    seed(&state).await;

    // Drop limiter entries whose window and block have both passed.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            store.cleanup_expired();
        }
    });

    let app = Router::new()
        .route("/", get(|| async { Html("<h1>Daily reports</h1>") }))
        .route("/login", get(|| async { Html("<h1>Sign in</h1>") }))
        .route("/sales", get(|| async { Html("<h1>Sales representatives</h1>") }))
        .nest("/api", api_routes::<Repo>())
        .layer(from_fn(persist_refreshed_session))
        .layer(from_fn_with_state(state.clone(), page_gate::<Repo>))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    println!("Starting session server on http://localhost:8080");
    println!("Environment: {:?}", config.environment);
    println!("Endpoints:");
    println!("  POST /api/auth/login    - Login (sets session cookie)");
    println!("  POST /api/auth/logout   - Logout (clears session cookie)");
    println!("  GET  /api/auth/session  - Current user, extends the session");
    println!("  POST /api/sales         - Enroll a representative (managers only)");

    let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
