use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{EntityKind, EntityLookup, LookupError, LookupOutcome, RetryPolicy};
use crate::errors::ServiceError;

/// Looks entities up with `GET {base}/{collection}/{id}` against their owning service.
///
/// 2xx means found. 401/403/408/429 and 5xx are not authoritative and surface as
/// errors; every other status means not found.
pub struct HttpEntityLookup {
    client: reqwest::Client,
    customer_base_url: String,
    product_base_url: String,
    retry: RetryPolicy,
}

impl HttpEntityLookup {
    pub fn new(
        customer_base_url: impl Into<String>,
        product_base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            customer_base_url: customer_base_url.into().trim_end_matches('/').to_string(),
            product_base_url: product_base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn url_for(&self, kind: EntityKind, id: u64) -> String {
        let base = match kind {
            EntityKind::Customer => &self.customer_base_url,
            EntityKind::Product => &self.product_base_url,
        };
        format!("{}/{}/{}", base, kind.collection(), id)
    }

    async fn attempt(&self, kind: EntityKind, url: &str, bearer: Option<&str>) -> Result<LookupOutcome, LookupError> {
        let mut req = self.client.get(url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        match req.send().await {
            Ok(resp) => classify(kind, resp.status().as_u16()),
            Err(e) if e.is_timeout() => Err(LookupError::Timeout { kind }),
            Err(e) => Err(LookupError::Transport { kind, reason: e.to_string() }),
        }
    }
}

fn classify(kind: EntityKind, status: u16) -> Result<LookupOutcome, LookupError> {
    match status {
        200..=299 => Ok(LookupOutcome::Found),
        401 | 403 | 408 | 429 | 500..=599 => Err(LookupError::Upstream { kind, status }),
        _ => Ok(LookupOutcome::NotFound),
    }
}

#[async_trait]
impl EntityLookup for HttpEntityLookup {
    #[instrument(skip(self, bearer), fields(kind = %kind))]
    async fn exists(&self, kind: EntityKind, id: u64, bearer: Option<&str>) -> Result<LookupOutcome, LookupError> {
        let url = self.url_for(kind, id);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(kind, &url, bearer).await {
                Ok(outcome) => {
                    debug!(%url, attempt, ?outcome, "lookup answered");
                    return Ok(outcome);
                }
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    self.retry.wait_before_retry(attempt).await;
                }
                Err(e) => {
                    warn!(%url, attempt, error = %e, "lookup failed");
                    return Err(e);
                }
            }
        }
    }
}
