use std::sync::Arc;

use models::Customer;
use tracing::instrument;

use crate::auth::{gate, AuthError, Principal, Role};
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::storage::Store;

/// Customer profiles. Any authenticated caller can read; the owning account or an
/// admin can edit; only admins create and delete.
pub struct CustomerService {
    records: CrudService<Customer>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn Store<Customer>>) -> Self {
        Self { records: CrudService::new("Customer", store) }
    }

    #[instrument(skip(self, customer), fields(actor = %actor.username))]
    pub async fn create(&self, actor: &Principal, customer: Customer) -> Result<u64, ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.create(customer).await
    }

    /// The principal argument is the proof of authentication; every role may read.
    pub async fn get(&self, _actor: &Principal, id: u64) -> Result<Customer, ServiceError> {
        self.records.get(id).await
    }

    /// Existence is checked first since ownership needs the stored record.
    ///
    /// A body without `username` keeps the current owner. Naming a different
    /// account is a reassignment and only admins may do it.
    #[instrument(skip(self, customer), fields(actor = %actor.username))]
    pub async fn update(&self, actor: &Principal, id: u64, mut customer: Customer) -> Result<(), ServiceError> {
        let existing = self.records.get(id).await?;
        gate::require_self_or_admin(actor, existing.username.as_deref())?;
        if customer.username.is_none() {
            customer.username = existing.username;
        } else if !actor.is_admin() && customer.username != existing.username {
            return Err(AuthError::Forbidden("only admins may reassign a customer's account".into()).into());
        }
        self.records.update(id, customer).await
    }

    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn delete(&self, actor: &Principal, id: u64) -> Result<(), ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.delete(id).await
    }
}
