use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::Store;
use crate::errors::ServiceError;

/// Concurrent in-memory store. Ids start at 1 and are never reused.
pub struct MemoryStore<T> {
    items: DashMap<u64, T>,
    next_id: AtomicU64,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self { items: DashMap::new(), next_id: AtomicU64::new(1) }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn create(&self, value: T) -> Result<u64, ServiceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.items.insert(id, value);
        Ok(id)
    }

    async fn get(&self, id: u64) -> Result<Option<T>, ServiceError> {
        Ok(self.items.get(&id).map(|v| v.value().clone()))
    }

    async fn update(&self, id: u64, value: T) -> Result<bool, ServiceError> {
        match self.items.get_mut(&id) {
            Some(mut slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        Ok(self.items.remove(&id).is_some())
    }
}
