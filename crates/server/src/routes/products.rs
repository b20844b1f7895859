use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::Product;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::extract::{AuthContext, Id, Payload};
use crate::state::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductCreated {
    pub product_id: u64,
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    security(("bearer" = [])),
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 201, description = "Created", body = ProductCreated),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: AuthContext,
    Payload(product): Payload<Product>,
) -> Result<(StatusCode, Json<ProductCreated>), ApiError> {
    let product_id = state.products.create(&auth.principal, product).await?;
    Ok((StatusCode::CREATED, Json(ProductCreated { product_id })))
}

/// Open to anonymous callers.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = u64, Path, description = "Product id")),
    responses((status = 200, description = "Found", body = crate::openapi::ProductDoc), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Id(id): Id) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Product id")),
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MessageDoc),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    auth: AuthContext,
    Id(id): Id,
    Payload(product): Payload<Product>,
) -> Result<Json<Message>, ApiError> {
    state.products.update(&auth.principal, id, product).await?;
    Ok(Json(Message::new("Product updated")))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Product id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin role required"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, auth: AuthContext, Id(id): Id) -> Result<StatusCode, ApiError> {
    state.products.delete(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
