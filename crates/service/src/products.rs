use std::sync::Arc;

use models::Product;
use tracing::instrument;

use crate::auth::{gate, Principal, Role};
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::storage::Store;

/// Product catalogue: reads are public, writes are admin-only.
pub struct ProductService {
    records: CrudService<Product>,
}

impl ProductService {
    pub fn new(store: Arc<dyn Store<Product>>) -> Self {
        Self { records: CrudService::new("Product", store) }
    }

    #[instrument(skip(self, product), fields(actor = %actor.username))]
    pub async fn create(&self, actor: &Principal, product: Product) -> Result<u64, ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.create(product).await
    }

    pub async fn get(&self, id: u64) -> Result<Product, ServiceError> {
        self.records.get(id).await
    }

    #[instrument(skip(self, product), fields(actor = %actor.username))]
    pub async fn update(&self, actor: &Principal, id: u64, product: Product) -> Result<(), ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.update(id, product).await
    }

    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn delete(&self, actor: &Principal, id: u64) -> Result<(), ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.delete(id).await
    }
}
