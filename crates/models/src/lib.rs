//! Resource records shared by the product, customer and order services,
//! together with the field rules each record must satisfy before it is stored.

pub mod errors;
pub mod product;
pub mod customer;
pub mod order;

pub use customer::Customer;
pub use errors::ModelError;
pub use order::Order;
pub use product::Product;

/// Field-level checks run before a record is created or replaced.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}
