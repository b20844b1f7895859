use models::ModelError;
use thiserror::Error;

use crate::auth::errors::AuthError;
use crate::lookup::{EntityKind, LookupError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid reference: {0} not found")]
    InvalidReference(EntityKind),
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(#[from] LookupError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::InvalidReference(_) => 2003,
            ServiceError::DependencyUnavailable(_) => 2101,
            ServiceError::Auth(e) => e.code(),
            ServiceError::Internal(_) => 2200,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
        }
    }
}
