//! Storage abstractions for service layer
//!
//! Resource services talk to a [`Store`] keyed by numeric id and never to a
//! concrete backend.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod memory;

pub use memory::MemoryStore;

/// Create/read/update/delete keyed by an auto-assigned `u64` id.
#[async_trait]
pub trait Store<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Allocate the next id and insert `value` under it as one step.
    async fn create(&self, value: T) -> Result<u64, ServiceError>;

    async fn get(&self, id: u64) -> Result<Option<T>, ServiceError>;

    /// Replace the value at `id`; returns whether it existed. Never inserts.
    async fn update(&self, id: u64, value: T) -> Result<bool, ServiceError>;

    /// Remove `id`; returns whether it existed.
    async fn delete(&self, id: u64) -> Result<bool, ServiceError>;
}
