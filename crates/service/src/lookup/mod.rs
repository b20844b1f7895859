//! Existence checks against the customer and product services.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod retry;

pub use http::HttpEntityLookup;
pub use retry::RetryPolicy;

/// The entity types an order references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customer,
    Product,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
        }
    }

    /// Path segment of the collection endpoint, e.g. `/customers/{id}`.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Product => "products",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative answer from the owning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Found,
    NotFound,
}

/// The lookup could not produce an authoritative answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{kind} lookup timed out")]
    Timeout { kind: EntityKind },
    #[error("{kind} lookup failed: {reason}")]
    Transport { kind: EntityKind, reason: String },
    #[error("{kind} service answered {status}")]
    Upstream { kind: EntityKind, status: u16 },
}

impl LookupError {
    pub fn kind(&self) -> EntityKind {
        match self {
            LookupError::Timeout { kind } | LookupError::Transport { kind, .. } | LookupError::Upstream { kind, .. } => *kind,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LookupError::Timeout { .. })
    }

    /// Transient failures worth another attempt. Auth refusals are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Timeout { .. } | LookupError::Transport { .. } => true,
            LookupError::Upstream { status, .. } => !matches!(status, 401 | 403),
        }
    }
}

/// Capability consumed by the order workflow.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// `bearer` is the caller's token, forwarded so protected lookup endpoints accept the call.
    async fn exists(&self, kind: EntityKind, id: u64, bearer: Option<&str>) -> Result<LookupOutcome, LookupError>;
}
