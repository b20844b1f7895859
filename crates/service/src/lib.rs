//! Service layer: authentication, role gating, resource CRUD and the order workflow.
//! - Independent of the web framework; the server crate maps results to HTTP.
//! - Storage and cross-service lookups sit behind traits so they can be swapped.

pub mod errors;
pub mod auth;
pub mod storage;
pub mod lookup;
pub mod crud;
pub mod products;
pub mod customers;
pub mod orders;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
