use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub customer_id: u64,
    pub product_id: u64,
    pub quantity: i64,
}

impl Validate for Order {
    fn validate(&self) -> Result<(), ModelError> {
        if self.quantity <= 0 {
            return Err(ModelError::Validation("quantity must be a positive integer".into()));
        }
        Ok(())
    }
}
