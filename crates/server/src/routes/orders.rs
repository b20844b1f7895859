use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::Order;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::extract::{AuthContext, Id, Payload};
use crate::observability::{record_order_rejection, ORDERS_CREATED_TOTAL};
use crate::state::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order_id: u64,
}

/// Place an order. The caller's token is forwarded to the customer and product lookups.
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    security(("bearer" = [])),
    request_body = crate::openapi::OrderDoc,
    responses(
        (status = 201, description = "Created", body = OrderCreated),
        (status = 400, description = "Invalid quantity, or customer/product not found"),
        (status = 403, description = "Customer role required"),
        (status = 502, description = "A lookup service is unavailable"),
        (status = 504, description = "A lookup timed out")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: AuthContext,
    Payload(order): Payload<Order>,
) -> Result<(StatusCode, Json<OrderCreated>), ApiError> {
    match state.orders.create(&auth.principal, order, Some(&auth.token)).await {
        Ok(order_id) => {
            ORDERS_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(OrderCreated { order_id })))
        }
        Err(e) => {
            record_order_rejection(&e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Order id")),
    responses((status = 200, description = "Found", body = crate::openapi::OrderDoc), (status = 401, description = "Unauthorized"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, auth: AuthContext, Id(id): Id) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.get(&auth.principal, id).await?))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Order id")),
    request_body = crate::openapi::OrderDoc,
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
    Payload(order): Payload<Order>,
) -> Result<Json<Message>, ApiError> {
    state.orders.update(&auth.principal, id, order).await?;
    Ok(Json(Message::new("Order updated")))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Order id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin role required"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, auth: AuthContext, Id(id): Id) -> Result<StatusCode, ApiError> {
    state.orders.delete(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
