use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{validate_name, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub description: String,
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ModelError> {
        validate_name(&self.name)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ModelError::Validation("price must be a non-negative number".into()));
        }
        Ok(())
    }
}
