use std::sync::{Arc, Mutex};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use cookie::Cookie;

use super::error::AppError;
use super::routes::AppState;
use crate::guard::{require_authenticated, require_manager, AuthenticatedSession, PageDecision};
use crate::CredentialRepository;

/// Extracts a valid session and extends it.
///
/// The extended cookie is written to the response by
/// [`persist_refreshed_session`], which must wrap the route.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedSession);

/// Same as [`Authenticated`] but rejects non-managers with 403.
#[derive(Debug, Clone)]
pub struct Manager(pub AuthenticatedSession);

/// Refreshed session cookie handed from an extractor to the response layer.
#[derive(Clone, Default)]
struct RefreshedCookie(Arc<Mutex<Option<Cookie<'static>>>>);

impl RefreshedCookie {
    fn set(&self, cookie: Cookie<'static>) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(cookie);
        }
    }

    fn take(&self) -> Option<Cookie<'static>> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

fn hand_off(parts: &Parts, session: &AuthenticatedSession) {
    let Some(cookie) = session.refreshed_cookie.clone() else {
        return;
    };
    match parts.extensions.get::<RefreshedCookie>() {
        Some(slot) => slot.set(cookie),
        None => {
            log::warn!(target: "daily_report_auth::session", "msg=\"refreshed session not persisted, persist_refreshed_session layer missing\" path=\"{}\"", parts.uri.path());
        }
    }
}

impl<C> FromRequestParts<AppState<C>> for Authenticated
where
    C: CredentialRepository + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        let session = require_authenticated(&state.sessions, &parts.headers)?;
        hand_off(parts, &session);
        Ok(Authenticated(session))
    }
}

impl<C> FromRequestParts<AppState<C>> for Manager
where
    C: CredentialRepository + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        let session = require_manager(&state.sessions, &parts.headers)?;
        hand_off(parts, &session);
        Ok(Manager(session))
    }
}

/// Appends the session cookie extended by [`Authenticated`] or [`Manager`]
/// as `Set-Cookie`.
///
/// [`api_routes`](super::api_routes) installs it for its own routes. Wrap
/// any other router that uses the extractors with
/// `axum::middleware::from_fn(persist_refreshed_session)`.
pub async fn persist_refreshed_session(mut req: Request, next: Next) -> Response {
    let slot = RefreshedCookie::default();
    req.extensions_mut().insert(slot.clone());

    let mut response = next.run(req).await;

    if let Some(cookie) = slot.take() {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => {
                log::error!(target: "daily_report_auth::session", "msg=\"refreshed session cookie is not a valid header\" error=\"{e}\"");
            }
        }
    }
    response
}

/// Redirects page navigation according to the session state.
///
/// Install with `axum::middleware::from_fn_with_state(state, page_gate::<C>)`.
pub async fn page_gate<C>(State(state): State<AppState<C>>, req: Request, next: Next) -> Response
where
    C: CredentialRepository + Clone + 'static,
{
    let session = state.sessions.get_session(req.headers());
    let is_valid = state.sessions.is_valid(&session);

    match state
        .page_gate
        .decide(req.uri().path(), is_valid, is_valid && session.is_manager())
    {
        PageDecision::Allow => next.run(req).await,
        PageDecision::Redirect(to) => Redirect::temporary(&to).into_response(),
    }
}
