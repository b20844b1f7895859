use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::Customer;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::extract::{AuthContext, Id, Payload};
use crate::state::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerCreated {
    pub customer_id: u64,
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    security(("bearer" = [])),
    request_body = crate::openapi::CustomerDoc,
    responses(
        (status = 201, description = "Created", body = CustomerCreated),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: AuthContext,
    Payload(customer): Payload<Customer>,
) -> Result<(StatusCode, Json<CustomerCreated>), ApiError> {
    let customer_id = state.customers.create(&auth.principal, customer).await?;
    Ok((StatusCode::CREATED, Json(CustomerCreated { customer_id })))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Customer id")),
    responses((status = 200, description = "Found", body = crate::openapi::CustomerDoc), (status = 401, description = "Unauthorized"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, auth: AuthContext, Id(id): Id) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.get(&auth.principal, id).await?))
}

/// Admins may edit any record; customers only the one linked to their account.
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Customer id")),
    request_body = crate::openapi::CustomerDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MessageDoc),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    auth: AuthContext,
    Id(id): Id,
    Payload(customer): Payload<Customer>,
) -> Result<Json<Message>, ApiError> {
    state.customers.update(&auth.principal, id, customer).await?;
    Ok(Json(Message::new("Customer updated")))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Customer id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin role required"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, auth: AuthContext, Id(id): Id) -> Result<StatusCode, ApiError> {
    state.customers.delete(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
