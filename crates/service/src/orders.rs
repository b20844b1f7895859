//! Order service and the cross-service creation workflow.
//!
//! Creation walks `Received → RoleChecked → CustomerVerified → ProductVerified →
//! Persisted`. Both lookups run concurrently; the customer result is judged
//! first, so a missing customer is reported even when the product lookup also
//! failed. Nothing is stored unless both entities were confirmed.

use std::fmt;
use std::sync::Arc;

use models::{Order, Validate};
use tracing::{debug, info, instrument, warn};

use crate::auth::{gate, Principal, Role};
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::lookup::{EntityKind, EntityLookup, LookupError, LookupOutcome};
use crate::storage::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
    Received,
    RoleChecked,
    CustomerVerified,
    ProductVerified,
    Persisted,
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStage::Received => "received",
            OrderStage::RoleChecked => "role_checked",
            OrderStage::CustomerVerified => "customer_verified",
            OrderStage::ProductVerified => "product_verified",
            OrderStage::Persisted => "persisted",
        };
        f.write_str(s)
    }
}

pub struct OrderService {
    records: CrudService<Order>,
    lookup: Arc<dyn EntityLookup>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store<Order>>, lookup: Arc<dyn EntityLookup>) -> Self {
        Self { records: CrudService::new("Order", store), lookup }
    }

    /// Place an order for a customer principal; returns the new order id.
    ///
    /// `bearer` is the caller's token, passed on to the lookups.
    #[instrument(skip(self, order, bearer), fields(actor = %actor.username, customer_id = order.customer_id, product_id = order.product_id))]
    pub async fn create(&self, actor: &Principal, order: Order, bearer: Option<&str>) -> Result<u64, ServiceError> {
        let mut stage = OrderStage::Received;
        if let Err(e) = gate::require_role(actor, Role::Customer) {
            warn!(%stage, "order rejected: requester is not a customer");
            return Err(e.into());
        }
        stage = OrderStage::RoleChecked;
        debug!(%stage);

        order.validate()?;

        let (customer, product) = tokio::join!(
            self.lookup.exists(EntityKind::Customer, order.customer_id, bearer),
            self.lookup.exists(EntityKind::Product, order.product_id, bearer),
        );

        verify(EntityKind::Customer, customer, stage)?;
        stage = OrderStage::CustomerVerified;
        debug!(%stage);

        verify(EntityKind::Product, product, stage)?;
        stage = OrderStage::ProductVerified;
        debug!(%stage);

        let id = self.records.create(order).await?;
        stage = OrderStage::Persisted;
        info!(%stage, order_id = id, "order created");
        Ok(id)
    }

    /// Any authenticated principal may read orders.
    pub async fn get(&self, _actor: &Principal, id: u64) -> Result<Order, ServiceError> {
        self.records.get(id).await
    }

    /// Admin-only replacement. References are not re-verified.
    #[instrument(skip(self, order), fields(actor = %actor.username))]
    pub async fn update(&self, actor: &Principal, id: u64, order: Order) -> Result<(), ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.update(id, order).await
    }

    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn delete(&self, actor: &Principal, id: u64) -> Result<(), ServiceError> {
        gate::require_role(actor, Role::Admin)?;
        self.records.delete(id).await
    }
}

fn verify(kind: EntityKind, result: Result<LookupOutcome, LookupError>, stage: OrderStage) -> Result<(), ServiceError> {
    match result {
        Ok(LookupOutcome::Found) => Ok(()),
        Ok(LookupOutcome::NotFound) => {
            warn!(%stage, %kind, "order rejected: reference not found");
            Err(ServiceError::InvalidReference(kind))
        }
        Err(e) => {
            warn!(%stage, %kind, error = %e, "order rejected: lookup unavailable");
            Err(ServiceError::DependencyUnavailable(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::storage::MemoryStore;
    use crate::test_support::{admin, customer, StubLookup};

    fn order() -> Order {
        Order { customer_id: 5, product_id: 9, quantity: 3 }
    }

    fn service(lookup: StubLookup) -> (OrderService, Arc<MemoryStore<Order>>, Arc<StubLookup>) {
        let store = Arc::new(MemoryStore::new());
        let lookup = Arc::new(lookup);
        let svc = OrderService::new(store.clone(), lookup.clone());
        (svc, store, lookup)
    }

    #[tokio::test]
    async fn creates_order_when_both_references_exist() {
        let (svc, store, lookup) = service(StubLookup::default().found(EntityKind::Customer, 5).found(EntityKind::Product, 9));
        let first = svc.create(&customer(), order(), Some("tok")).await.unwrap();
        let second = svc.create(&customer(), order(), Some("tok")).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(svc.get(&customer(), first).await.unwrap(), order());
        assert_eq!(store.len(), 2);
        assert_eq!(lookup.bearers(), vec![Some("tok".to_string()); 4]);
    }

    #[tokio::test]
    async fn missing_customer_wins_regardless_of_product() {
        for product in [StubLookup::default().found(EntityKind::Product, 9), StubLookup::default()] {
            let (svc, store, _) = service(product);
            let err = svc.create(&customer(), order(), None).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidReference(EntityKind::Customer)));
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn missing_product_is_invalid_reference() {
        let (svc, store, _) = service(StubLookup::default().found(EntityKind::Customer, 5));
        let err = svc.create(&customer(), order(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidReference(EntityKind::Product)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unavailable_lookup_is_not_reported_as_missing() {
        let stub = StubLookup::default()
            .found(EntityKind::Customer, 5)
            .failing(EntityKind::Product, 9, LookupError::Timeout { kind: EntityKind::Product });
        let (svc, store, _) = service(stub);
        let err = svc.create(&customer(), order(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::DependencyUnavailable(LookupError::Timeout { kind: EntityKind::Product })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn only_customers_place_orders() {
        let (svc, store, lookup) = service(StubLookup::default().found(EntityKind::Customer, 5).found(EntityKind::Product, 9));
        let err = svc.create(&admin(), order(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthError::Forbidden(_))));
        assert!(store.is_empty());
        assert!(lookup.bearers().is_empty(), "no lookup before the role check");
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_lookups() {
        let (svc, _, lookup) = service(StubLookup::default());
        let bad = Order { quantity: 0, ..order() };
        assert!(matches!(svc.create(&customer(), bad, None).await, Err(ServiceError::Validation(_))));
        assert!(lookup.bearers().is_empty());
    }

    #[tokio::test]
    async fn role_is_checked_before_quantity() {
        let (svc, _, lookup) = service(StubLookup::default());
        let bad = Order { quantity: 0, ..order() };
        assert!(matches!(svc.create(&admin(), bad, None).await, Err(ServiceError::Auth(AuthError::Forbidden(_)))));
        assert!(lookup.bearers().is_empty());
    }

    #[tokio::test]
    async fn admin_updates_and_deletes() {
        let (svc, _, _) = service(StubLookup::default().found(EntityKind::Customer, 5).found(EntityKind::Product, 9));
        let id = svc.create(&customer(), order(), None).await.unwrap();

        let bigger = Order { quantity: 7, ..order() };
        assert!(matches!(svc.update(&customer(), id, bigger.clone()).await, Err(ServiceError::Auth(AuthError::Forbidden(_)))));
        svc.update(&admin(), id, bigger.clone()).await.unwrap();
        svc.update(&admin(), id, bigger.clone()).await.unwrap();
        assert_eq!(svc.get(&admin(), id).await.unwrap(), bigger);

        svc.delete(&admin(), id).await.unwrap();
        assert!(matches!(svc.get(&admin(), id).await, Err(ServiceError::NotFound(_))));
    }
}
