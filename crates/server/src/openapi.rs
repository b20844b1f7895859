use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::routes::{customers::CustomerCreated, orders::OrderCreated, products::ProductCreated};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenResponse { pub access_token: String, pub token_type: String, pub expires_in: i64 }

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// `admin` or `customer`
    pub role: String,
}

#[derive(ToSchema)]
pub struct PrincipalDoc { pub username: String, pub role: String }

#[derive(ToSchema)]
pub struct ProductDoc { pub name: String, pub price: f64, pub description: String }

#[derive(ToSchema)]
pub struct CustomerDoc {
    pub name: String,
    pub email: String,
    /// Account allowed to edit this record besides admins.
    pub username: Option<String>,
}

#[derive(ToSchema)]
pub struct OrderDoc { pub customer_id: u64, pub product_id: u64, pub quantity: i64 }

#[derive(ToSchema)]
pub struct MessageDoc { pub msg: String }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::register,
        crate::routes::products::create,
        crate::routes::products::get,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::customers::create,
        crate::routes::customers::get,
        crate::routes::customers::update,
        crate::routes::customers::delete,
        crate::routes::orders::create,
        crate::routes::orders::get,
        crate::routes::orders::update,
        crate::routes::orders::delete,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TokenResponse,
            RegisterRequest,
            PrincipalDoc,
            ProductDoc,
            CustomerDoc,
            OrderDoc,
            MessageDoc,
            ProductCreated,
            CustomerCreated,
            OrderCreated,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "products"),
        (name = "customers"),
        (name = "orders")
    )
)]
pub struct ApiDoc;
