use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::auth::AuthError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// HTTP-facing error. The body is `{"error": <reason phrase>, "detail": <message>}`.
#[derive(Debug, Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
    /// Stable code of the originating error, logged for 5xx.
    pub code: Option<u16>,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into(), code: None }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn rate_limited() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
    }

    fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        let err = match &e {
            AuthError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, e.to_string()),
            AuthError::InvalidToken(_) => ApiError::new(StatusCode::UNAUTHORIZED, "could not validate credentials"),
            AuthError::Forbidden(_) => ApiError::new(StatusCode::FORBIDDEN, e.to_string()),
            AuthError::Validation(msg) => ApiError::bad_request(msg.clone()),
            AuthError::Conflict => ApiError::new(StatusCode::CONFLICT, e.to_string()),
            AuthError::HashError(_) | AuthError::TokenError(_) => {
                error!(code, error = %e, "auth internal error");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };
        err.with_code(code)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        let err = match e {
            ServiceError::Auth(auth) => return ApiError::from(auth),
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            ServiceError::InvalidReference(kind) => ApiError::bad_request(format!("{kind} not found")),
            ServiceError::DependencyUnavailable(cause) => {
                let status = if cause.is_timeout() { StatusCode::GATEWAY_TIMEOUT } else { StatusCode::BAD_GATEWAY };
                ApiError::new(status, cause.to_string())
            }
            ServiceError::Internal(msg) => {
                error!(code, error = %msg, "service internal error");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };
        err.with_code(code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = ?self.code, detail = %self.detail, "request failed");
        }
        let title = self.status.canonical_reason().unwrap_or("Error");
        let body = ErrorBody::new(title, Some(self.detail));
        let mut resp = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            resp.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}
