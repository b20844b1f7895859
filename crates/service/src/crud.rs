//! Validation, store access and not-found mapping shared by every resource service.
//! Access rules stay in the per-resource services.

use std::sync::Arc;

use models::Validate;
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::Store;

pub struct CrudService<T> {
    kind: &'static str,
    store: Arc<dyn Store<T>>,
}

impl<T> CrudService<T>
where
    T: Validate + Clone + Send + Sync + 'static,
{
    /// `kind` is the display name used in errors and logs, e.g. `"Product"`.
    pub fn new(kind: &'static str, store: Arc<dyn Store<T>>) -> Self {
        Self { kind, store }
    }

    pub async fn create(&self, value: T) -> Result<u64, ServiceError> {
        value.validate()?;
        let id = self.store.create(value).await?;
        info!(kind = self.kind, id, "record created");
        Ok(id)
    }

    pub async fn get(&self, id: u64) -> Result<T, ServiceError> {
        self.store.get(id).await?.ok_or_else(|| ServiceError::not_found(self.kind))
    }

    pub async fn update(&self, id: u64, value: T) -> Result<(), ServiceError> {
        value.validate()?;
        if !self.store.update(id, value).await? {
            return Err(ServiceError::not_found(self.kind));
        }
        info!(kind = self.kind, id, "record updated");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::not_found(self.kind));
        }
        info!(kind = self.kind, id, "record deleted");
        Ok(())
    }
}
