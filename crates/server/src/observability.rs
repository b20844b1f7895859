use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};
use service::lookup::EntityKind;
use service::ServiceError;

// Prometheus metrics (default registry)
pub static LOGIN_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "microshop_login_attempts_total",
        "Token requests by outcome",
        &["outcome"]
    )
    .expect("register login_attempts_total")
});

pub static TOKEN_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "microshop_token_rejections_total",
        "Requests rejected for a missing or invalid bearer token"
    )
    .expect("register token_rejections_total")
});

pub static ORDERS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("microshop_orders_created_total", "Orders persisted")
        .expect("register orders_created_total")
});

pub static ORDER_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "microshop_order_rejections_total",
        "Order creations refused, by reason",
        &["reason"]
    )
    .expect("register order_rejections_total")
});

pub static LOOKUP_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "microshop_lookup_failures_total",
        "Customer/product lookups that could not get an authoritative answer",
        &["kind"]
    )
    .expect("register lookup_failures_total")
});

pub static RATE_LIMITED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "microshop_rate_limited_total",
        "Total requests rejected by rate limiter"
    )
    .expect("register rate_limited_total")
});

/// Count a refused order under a label derived from the error.
pub fn record_order_rejection(err: &ServiceError) {
    let reason = match err {
        ServiceError::Validation(_) => "validation",
        ServiceError::Auth(_) => "forbidden",
        ServiceError::InvalidReference(EntityKind::Customer) => "customer_not_found",
        ServiceError::InvalidReference(EntityKind::Product) => "product_not_found",
        ServiceError::DependencyUnavailable(cause) => {
            LOOKUP_FAILURES_TOTAL.with_label_values(&[cause.kind().as_str()]).inc();
            "dependency_unavailable"
        }
        ServiceError::NotFound(_) | ServiceError::Internal(_) => "internal",
    };
    ORDER_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
