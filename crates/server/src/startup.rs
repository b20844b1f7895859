use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use argon2::Params;
use axum::Router;
use configs::{AppConfig, SeedUser};
use models::{Customer, Order, Product};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::domain::{Role, SeedAccount, SeedSecret};
use service::auth::repository::memory::InMemoryCredentialRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::customers::CustomerService;
use service::lookup::{HttpEntityLookup, RetryPolicy};
use service::orders::OrderService;
use service::products::ProductService;
use service::storage::MemoryStore;

use crate::rate_limit::RateLimiter;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn seed_account(user: &SeedUser) -> anyhow::Result<SeedAccount> {
    let role: Role = user.role.parse()?;
    let secret = match (&user.password, &user.password_hash) {
        (Some(plain), _) => SeedSecret::Plain(plain.clone()),
        (None, Some(hash)) => SeedSecret::Hash(hash.clone()),
        (None, None) => return Err(anyhow!("seed user '{}' has neither password nor password_hash", user.username)),
    };
    Ok(SeedAccount { username: user.username.clone(), role, secret })
}

/// Wire stores, services and the lookup client from configuration, seeding the
/// credential store with the configured accounts.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let params = Params::new(cfg.auth.hash_memory_kib, cfg.auth.hash_iterations, cfg.auth.hash_parallelism, None)
        .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
    let auth_cfg = AuthConfig::new(cfg.auth.jwt_secret.clone())
        .with_ttl(chrono::Duration::minutes(cfg.auth.token_ttl_minutes))
        .with_argon2_params(params);
    let auth = AuthService::new(Arc::new(InMemoryCredentialRepository::default()), auth_cfg);

    let accounts = cfg.auth.users.iter().map(seed_account).collect::<anyhow::Result<Vec<_>>>()?;
    auth.seed(accounts).await.context("seeding accounts")?;

    let lookup_cfg = &cfg.lookup;
    let retry = RetryPolicy::new(
        lookup_cfg.max_attempts,
        Duration::from_millis(lookup_cfg.backoff_base_ms),
        Duration::from_millis(lookup_cfg.backoff_max_ms),
    );
    let lookup = HttpEntityLookup::new(
        lookup_cfg.customer_base_url.clone(),
        lookup_cfg.product_base_url.clone(),
        Duration::from_millis(lookup_cfg.timeout_ms),
        retry,
    )?;
    info!(customers = %lookup_cfg.customer_base_url, products = %lookup_cfg.product_base_url, "entity lookups configured");

    Ok(ServerState {
        auth: Arc::new(auth),
        products: Arc::new(ProductService::new(Arc::new(MemoryStore::<Product>::new()))),
        customers: Arc::new(CustomerService::new(Arc::new(MemoryStore::<Customer>::new()))),
        orders: Arc::new(OrderService::new(Arc::new(MemoryStore::<Order>::new()), Arc::new(lookup))),
        rate_limiter: RateLimiter::from_config(&cfg.rate_limit),
    })
}

pub fn app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve on an already bound listener. Tests bind port 0 first so the lookups
/// can be pointed back at the same process.
pub async fn serve(listener: TcpListener, state: ServerState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "starting server");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Public entry: build the app from a validated config and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .with_context(|| format!("binding {}:{}", cfg.server.host, cfg.server.port))?;
    serve(listener, state).await
}
