use std::sync::Arc;

use service::auth::repository::memory::InMemoryCredentialRepository;
use service::auth::AuthService;
use service::customers::CustomerService;
use service::orders::OrderService;
use service::products::ProductService;

use crate::rate_limit::RateLimiter;

/// Everything a handler needs; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<InMemoryCredentialRepository>>,
    pub products: Arc<ProductService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
    pub rate_limiter: RateLimiter,
}
