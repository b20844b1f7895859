//! Request extractors shared by the route handlers.
//!
//! [`AuthContext`] turns an `Authorization: Bearer` header into a validated
//! principal. Handlers that are open to anonymous callers simply don't take it.

use axum::extract::{Form, FromRequest, FromRequestParts, Path, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use service::auth::{AuthError, Principal};

use crate::errors::ApiError;
use crate::observability::TOKEN_REJECTIONS_TOTAL;
use crate::state::ServerState;

/// The authenticated caller plus the raw token, kept for forwarding to lookups.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    pub token: String,
}

/// Pull the token out of `Authorization: Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<ServerState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            TOKEN_REJECTIONS_TOTAL.inc();
            return Err(AuthError::InvalidToken("missing bearer token".into()).into());
        };
        match state.auth.validate(token).await {
            Ok(principal) => Ok(Self { principal, token: token.to_string() }),
            Err(e) => {
                TOKEN_REJECTIONS_TOTAL.inc();
                Err(e.into())
            }
        }
    }
}

/// Numeric record id from a `/:id` segment. Anything that does not parse as a
/// `u64` becomes a 400 with the usual error envelope.
#[derive(Debug, Clone, Copy)]
pub struct Id(pub u64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(id))
    }
}

/// Request body accepted either as `application/x-www-form-urlencoded` or JSON.
/// Malformed bodies become a 400 with the usual error envelope.
///
/// On admin-only routes the body is parsed before the service checks the role,
/// so a non-admin sending a malformed body sees 400 rather than 403.
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static(value));
        h
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
