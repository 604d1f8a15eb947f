use axum::http::header::RETRY_AFTER;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::{status_for, ErrorEnvelope};
use crate::AuthError;

/// converts `AuthError` into the error envelope with its HTTP status
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            log::error!(target: "daily_report_auth", "msg=\"request failed\" error=\"{}\"", self.0);
        }

        let mut response = (status, Json(ErrorEnvelope::from(&self.0))).into_response();
        if let AuthError::RateLimited { retry_after_secs } = self.0 {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
