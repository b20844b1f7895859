use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::observability::RATE_LIMITED_TOTAL;

#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            capacity: capacity as f64,
            tokens: capacity as f64,
            refill_rate: refill_rate as f64,
            last_refill: Instant::now(),
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            debug!(remaining = self.tokens, "token acquired");
            true
        } else {
            warn!(tokens = self.tokens, "rate limit exceeded");
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Shared token bucket; cloning shares the bucket.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_second: u64, burst_size: u64, enabled: bool) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(burst_size, requests_per_second))),
            enabled,
        }
    }

    pub fn from_config(cfg: &configs::RateLimitConfig) -> Self {
        Self::new(cfg.requests_per_second, cfg.burst_size, cfg.enabled)
    }

    pub async fn check_rate_limit(&self) -> bool {
        if !self.enabled {
            return true;
        }
        let mut bucket = self.bucket.lock().await;
        bucket.try_acquire()
    }
}

/// Middleware: reject with 429 once the bucket is empty.
pub async fn enforce(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    if !limiter.check_rate_limit().await {
        RATE_LIMITED_TOTAL.inc();
        return ApiError::rate_limited().into_response();
    }
    next.run(req).await
}
