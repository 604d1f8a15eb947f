//! HTTP handlers for the session endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use cookie::Cookie;

use super::error::AppError;
use super::middleware::Manager;
use super::routes::AppState;
use crate::actions::{EnrollCredentialAction, LoginAction, LogoutAction};
use crate::api::{
    EnrollRequest, EnrolledResponse, LoginRequest, LoginResponse, MessageResponse,
    SessionResponse, SuccessEnvelope, UserSummary,
};
use crate::guard::require_authenticated;
use crate::{AuthError, CredentialRepository};

/// Authenticate with a login code and password and start a session.
///
/// POST /auth/login
pub async fn login<C>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    C: CredentialRepository + Clone + 'static,
{
    let Json(body) = body.map_err(body_rejected)?;
    let client = state.client_ip.resolve(&headers);

    let action = LoginAction::new(
        state.credentials,
        state.limiter,
        Arc::clone(&state.hasher),
        state.sessions,
    );
    let outcome = action
        .execute(body.login_code.trim(), &body.password, &client)
        .await?;

    let session_id = outcome.user.id.clone();
    Ok((
        StatusCode::OK,
        set_cookies([outcome.cookie])?,
        Json(SuccessEnvelope::new(LoginResponse {
            user: UserSummary::from(outcome.user),
            session_id,
        })),
    ))
}

/// End the current session. Succeeds without a session too.
///
/// POST /auth/logout
pub async fn logout<C>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    C: CredentialRepository + Clone + 'static,
{
    let mut session = state.sessions.get_session(&headers);
    let removal = LogoutAction::new(state.sessions).execute(&mut session).await;

    Ok((
        StatusCode::OK,
        set_cookies([removal])?,
        Json(SuccessEnvelope::new(MessageResponse {
            message: "Logged out".to_owned(),
        })),
    ))
}

/// Report the current user and extend the session.
///
/// GET /auth/session
pub async fn session_check<C>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    C: CredentialRepository + Clone + 'static,
{
    let authenticated = require_authenticated(&state.sessions, &headers).map_err(|e| match e {
        AuthError::Unauthenticated => AppError(AuthError::SessionExpired),
        other => AppError(other),
    })?;

    let session_expires_at = chrono::DateTime::from_timestamp_millis(authenticated.expires_at)
        .ok_or_else(|| AuthError::Internal("session expiry out of range".to_owned()))?;

    Ok((
        StatusCode::OK,
        set_cookies(authenticated.refreshed_cookie.clone())?,
        Json(SuccessEnvelope::new(SessionResponse {
            user: UserSummary::from(&authenticated),
            session_expires_at,
        })),
    ))
}

/// Enroll a sales representative. Managers only.
///
/// POST /sales
pub async fn enroll<C>(
    State(state): State<AppState<C>>,
    Manager(manager): Manager,
    body: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    C: CredentialRepository + Clone + 'static,
{
    let Json(body) = body.map_err(body_rejected)?;

    let record = EnrollCredentialAction::new(state.credentials, Arc::clone(&state.hasher))
        .execute(body, &manager.user.subject_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessEnvelope::new(EnrolledResponse::from(record))),
    ))
}

fn body_rejected(rejection: JsonRejection) -> AppError {
    log::debug!(target: "daily_report_auth", "msg=\"request body rejected\" reason=\"{rejection}\"");
    AppError(AuthError::field("body", "Request body must be a valid JSON object"))
}

fn set_cookies(
    cookies: impl IntoIterator<Item = Cookie<'static>>,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| AuthError::Internal(format!("invalid Set-Cookie value: {e}")))?;
        headers.append(SET_COOKIE, value);
    }
    Ok(headers)
}
