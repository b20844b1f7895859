use axum::{extract::State, http::StatusCode, Json};
use service::auth::domain::{AccessToken, LoginInput, RegisterInput};
use service::auth::Principal;
use tracing::info;

use crate::errors::ApiError;
use crate::extract::{AuthContext, Payload};
use crate::observability::LOGIN_ATTEMPTS_TOTAL;
use crate::state::ServerState;

#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body(content = crate::openapi::LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = crate::openapi::TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 429, description = "Too many token requests")
    )
)]
pub async fn login(State(state): State<ServerState>, Payload(input): Payload<LoginInput>) -> Result<Json<AccessToken>, ApiError> {
    match state.auth.issue_token(&input.username, &input.password).await {
        Ok(token) => {
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
            Ok(Json(token))
        }
        Err(e) => {
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer" = [])),
    responses((status = 200, description = "The authenticated caller", body = crate::openapi::PrincipalDoc), (status = 401, description = "Unauthorized"))
)]
pub async fn me(auth: AuthContext) -> Json<Principal> {
    Json(auth.principal)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "auth",
    security(("bearer" = [])),
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = crate::openapi::PrincipalDoc),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    auth: AuthContext,
    Payload(input): Payload<RegisterInput>,
) -> Result<(StatusCode, Json<Principal>), ApiError> {
    let created = state.auth.register(&auth.principal, input).await?;
    info!(username = %created.username, role = %created.role, "account registered via api");
    Ok((StatusCode::CREATED, Json(created)))
}
