//! End-to-end tests for the axum HTTP API layer.
//!
//! Everything runs against the in-memory credential store.
//! Run with: `cargo test --test e2e_axum`

#![cfg(feature = "axum_api")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use daily_report_auth::api::axum::{
    api_routes, page_gate, persist_refreshed_session, AppState, Authenticated,
};
use daily_report_auth::crypto::{Argon2Hasher, PasswordHasher};
use daily_report_auth::guard::{PageGate, PageGateConfig};
use daily_report_auth::rate_limit::{ClientIpResolver, Limit, RateLimiter};
use daily_report_auth::session::{SessionConfig, SessionData, SessionManager};
use daily_report_auth::{
    CredentialRepository, InMemoryCredentialRepository, NewCredential, SecretString,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const PASSWORD: &str = "Password123!";

type Repo = InMemoryCredentialRepository;

async fn create_state() -> AppState<Repo> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new(1024, 1, 1));
    let credentials = InMemoryCredentialRepository::new();
    let password_hash = hasher.hash(PASSWORD).unwrap();

    let manager = credentials
        .insert(NewCredential {
            login_code: "M0001".to_owned(),
            name: "Yamada".to_owned(),
            email: "yamada@example.com".to_owned(),
            department: "Sales HQ".to_owned(),
            is_manager: true,
            password_hash: password_hash.clone(),
            manager_id: None,
        })
        .await
        .unwrap();
    credentials
        .insert(NewCredential {
            login_code: "S0001".to_owned(),
            name: "Tanaka".to_owned(),
            email: "tanaka@example.com".to_owned(),
            department: "Sales 1".to_owned(),
            is_manager: false,
            password_hash,
            manager_id: Some(manager.id),
        })
        .await
        .unwrap();

    let sessions = SessionManager::new(SessionConfig {
        secret_key: SecretString::new("e2e-session-secret-that-is-long-enough"),
        ..SessionConfig::default()
    })
    .unwrap();

    AppState {
        credentials,
        sessions,
        limiter: RateLimiter::in_memory(Limit::login()),
        hasher,
        client_ip: ClientIpResolver::new(true),
        page_gate: PageGate::new(PageGateConfig::default()),
    }
}

async fn whoami(Authenticated(session): Authenticated) -> String {
    session.user.subject_code
}

fn create_app(state: AppState<Repo>) -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/login", get(|| async { "login page" }))
        .route("/reports", get(|| async { "reports" }))
        .route("/sales/new", get(|| async { "new sales rep" }))
        .nest("/api", api_routes::<Repo>().route("/whoami", get(whoami)))
        .layer(from_fn(persist_refreshed_session))
        .layer(from_fn_with_state(state.clone(), page_gate::<Repo>))
        .with_state(state)
}

async fn body_to_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToOwned::to_owned)
}

fn login_request(code: &str, password: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            serde_json::json!({ "login_code": code, "password": password }).to_string(),
        ))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn login_cookie(app: &Router, code: &str) -> String {
    let response = app
        .clone()
        .oneshot(login_request(code, PASSWORD, "10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).unwrap()
}

#[tokio::test]
async fn test_login_success_issues_cookie() {
    let app = create_app(create_state().await);

    let response = app
        .oneshot(login_request("S0001", PASSWORD, "10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(set_cookie.starts_with("sales_daily_report_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let body = body_to_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["user"]["login_code"], "S0001");
    assert_eq!(body["data"]["user"]["manager"]["name"], "Yamada");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert_eq!(body["data"]["session_id"], body["data"]["user"]["id"]);
}

#[tokio::test]
async fn test_login_accepts_sales_code_alias() {
    let app = create_app(create_state().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "sales_code": "S0001", "password": PASSWORD }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_code_look_the_same() {
    let app = create_app(create_state().await);

    let wrong = app
        .clone()
        .oneshot(login_request("S0001", "Wrong123!pass", "10.0.0.2"))
        .await
        .unwrap();
    let unknown = app
        .oneshot(login_request("S9999", PASSWORD, "10.0.0.3"))
        .await
        .unwrap();

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let wrong = body_to_json(wrong).await;
    let unknown = body_to_json(unknown).await;
    assert_eq!(wrong["error"]["code"], "AUTH_INVALID_CREDENTIALS");
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = create_app(create_state().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["login_code", "password"]);
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = create_app(create_state().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_sixth_attempt_is_throttled_even_with_correct_password() {
    let app = create_app(create_state().await);

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(login_request("S0001", "Wrong123!pass", "203.0.113.7"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(login_request("S0001", PASSWORD, "203.0.113.7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 300);

    let body = body_to_json(response).await;
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains(&format!("{retry_after} seconds")));

    // A different client still gets in.
    let other = app
        .oneshot(login_request("S0001", PASSWORD, "198.51.100.4"))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = create_app(create_state().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "Logged out");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = create_app(create_state().await);
    let cookie = login_cookie(&app, "S0001").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let removal = session_cookie(&response).unwrap();
    assert_eq!(removal, "sales_daily_report_session=");

    let check = app
        .oneshot(get_with_cookie("/api/auth/session", Some(&removal)))
        .await
        .unwrap();
    assert_eq!(check.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_check_returns_user_and_refreshes() {
    let app = create_app(create_state().await);
    let cookie = login_cookie(&app, "S0001").await;

    let response = app
        .oneshot(get_with_cookie("/api/auth/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());

    let body = body_to_json(response).await;
    assert_eq!(body["data"]["user"]["login_code"], "S0001");
    assert_eq!(body["data"]["user"]["is_manager"], false);

    let expires_at: chrono::DateTime<Utc> =
        serde_json::from_value(body["data"]["session_expires_at"].clone()).unwrap();
    let remaining = expires_at - Utc::now();
    assert!(remaining.num_seconds() > 1790 && remaining.num_seconds() <= 1800);
}

#[tokio::test]
async fn test_session_check_with_expired_session() {
    let state = create_state().await;
    let record = state
        .credentials
        .find_by_login_code("S0001")
        .await
        .unwrap()
        .unwrap();
    let expired = state
        .sessions
        .set_data_at(
            &mut SessionData::default(),
            record.session_user(),
            Utc::now().timestamp_millis() - 1_801_000,
        )
        .unwrap();
    let cookie = format!("{}={}", expired.name(), expired.value());

    let response = create_app(state)
        .oneshot(get_with_cookie("/api/auth/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_to_json(response).await["error"]["code"],
        "AUTH_SESSION_EXPIRED"
    );
}

#[tokio::test]
async fn test_session_check_with_tampered_cookie() {
    let app = create_app(create_state().await);
    let mut cookie = login_cookie(&app, "S0001").await;
    cookie.push('A');

    let response = app
        .oneshot(get_with_cookie("/api/auth/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_guard() {
    let app = create_app(create_state().await);

    let anonymous = app
        .clone()
        .oneshot(get_with_cookie("/api/whoami", None))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body = body_to_json(anonymous).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "AUTH_UNAUTHORIZED");

    let cookie = login_cookie(&app, "S0001").await;
    let response = app
        .oneshot(get_with_cookie("/api/whoami", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guarded_route_extends_session() {
    let app = create_app(create_state().await);
    let cookie = login_cookie(&app, "S0001").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/whoami", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
    assert_eq!(set_cookies.len(), 1);
    let extended = session_cookie(&response).unwrap();
    assert!(extended.starts_with("sales_daily_report_session="));
    assert_ne!(extended, cookie);

    let again = app
        .oneshot(get_with_cookie("/api/whoami", Some(&extended)))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_guard_sets_no_cookie() {
    let app = create_app(create_state().await);

    let response = app
        .oneshot(get_with_cookie("/api/whoami", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

fn enroll_request(cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/sales")
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn new_rep(code: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "login_code": code,
        "name": "Suzuki",
        "email": email,
        "department": "Sales 2",
        "password": "Password456!",
    })
}

#[tokio::test]
async fn test_enroll_requires_manager() {
    let app = create_app(create_state().await);

    let anonymous = app
        .clone()
        .oneshot(enroll_request(None, new_rep("S0002", "suzuki@example.com")))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let rep_cookie = login_cookie(&app, "S0001").await;
    let forbidden = app
        .oneshot(enroll_request(
            Some(&rep_cookie),
            new_rep("S0002", "suzuki@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_to_json(forbidden).await["error"]["code"], "AUTH_FORBIDDEN");
}

#[tokio::test]
async fn test_enroll_then_login_as_new_rep() {
    let app = create_app(create_state().await);
    let manager_cookie = login_cookie(&app, "M0001").await;

    let response = app
        .clone()
        .oneshot(enroll_request(
            Some(&manager_cookie),
            new_rep("S0002", "suzuki@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(session_cookie(&response).is_some());

    let body = body_to_json(response).await;
    assert_eq!(body["data"]["login_code"], "S0002");
    assert_eq!(body["data"]["name"], "Suzuki");
    assert!(body["data"]["created_at"].is_string());

    let login = app
        .oneshot(login_request("S0002", "Password456!", "10.0.0.9"))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_enroll_conflict_and_validation() {
    let app = create_app(create_state().await);
    let manager_cookie = login_cookie(&app, "M0001").await;

    let taken = app
        .clone()
        .oneshot(enroll_request(
            Some(&manager_cookie),
            new_rep("S0001", "another@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::CONFLICT);
    assert_eq!(body_to_json(taken).await["error"]["code"], "RESOURCE_CONFLICT");

    let weak = app
        .oneshot(enroll_request(
            Some(&manager_cookie),
            serde_json::json!({
                "login_code": "S0003",
                "name": "Kato",
                "email": "kato@example.com",
                "department": "Sales 3",
                "password": "weakpass",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(weak.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(weak).await;
    let messages: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["field"] == "password")
        .map(|d| d["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"Password must be at least 10 characters"));
    assert!(messages.contains(&"Password must contain an uppercase letter (A-Z)"));
}

#[tokio::test]
async fn test_page_gate_redirects_anonymous_to_login() {
    let app = create_app(create_state().await);

    let response = app
        .clone()
        .oneshot(get_with_cookie("/reports", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let login_page = app.oneshot(get_with_cookie("/login", None)).await.unwrap();
    assert_eq!(login_page.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_page_gate_for_signed_in_users() {
    let app = create_app(create_state().await);
    let rep_cookie = login_cookie(&app, "S0001").await;
    let manager_cookie = login_cookie(&app, "M0001").await;

    let login_page = app
        .clone()
        .oneshot(get_with_cookie("/login", Some(&rep_cookie)))
        .await
        .unwrap();
    assert_eq!(login_page.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(login_page.headers()[header::LOCATION], "/");

    let rep_sales = app
        .clone()
        .oneshot(get_with_cookie("/sales/new", Some(&rep_cookie)))
        .await
        .unwrap();
    assert_eq!(rep_sales.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(rep_sales.headers()[header::LOCATION], "/");

    let manager_sales = app
        .oneshot(get_with_cookie("/sales/new", Some(&manager_cookie)))
        .await
        .unwrap();
    assert_eq!(manager_sales.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_page_gate_leaves_api_to_guards() {
    let app = create_app(create_state().await);

    let response = app
        .oneshot(get_with_cookie("/api/auth/session", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
