use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use common::{OrderId, PaymentId, ProductId, ShipmentId};
use domain::repository::RepositoryResult;
use domain::{
    AggregateRoot, Order, OrderNumber, OrderRepository, Payment, PaymentRepository, Product,
    ProductRepository, RepositoryError, Shipment, ShipmentRepository, Sku, Store, TrackingNumber,
    UnitOfWork,
};

/// A write staged against the store, applied at commit time.
#[derive(Debug, Clone)]
enum Change {
    AddProduct(Product),
    UpdateProduct(Product),
    DeleteProduct(ProductId),
    DecrementStock { id: ProductId, quantity: u32 },
    AddOrder(Order),
    UpdateOrder(Order),
    DeleteOrder(OrderId),
    AddPayment(Payment),
    UpdatePayment(Payment),
    DeletePayment(PaymentId),
    AddShipment(Shipment),
    UpdateShipment(Shipment),
    DeleteShipment(ShipmentId),
}

#[derive(Default)]
struct State {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    payments: HashMap<PaymentId, Payment>,
    shipments: HashMap<ShipmentId, Shipment>,
}

/// In-memory store.
///
/// Holds committed state only; all writes go through a request-scoped
/// [`InMemorySession`] opened with [`Store::begin`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed products.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

impl Store for InMemoryStore {
    type Uow = InMemorySession;

    fn begin(&self) -> InMemorySession {
        InMemorySession {
            state: self.state.clone(),
            pending: Mutex::new(Vec::new()),
        }
    }
}

/// One request's unit of work against an [`InMemoryStore`].
///
/// Reads see committed state only. Writes are staged in order and applied
/// by [`commit`](UnitOfWork::commit) under one write lock: conditional
/// stock decrements and the order-number uniqueness constraint are
/// validated first, and a failed validation discards the whole batch and
/// leaves state untouched.
pub struct InMemorySession {
    state: Arc<RwLock<State>>,
    pending: Mutex<Vec<Change>>,
}

impl InMemorySession {
    /// Returns the number of staged, uncommitted changes.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn stage(&self, change: Change) {
        self.pending.lock().await.push(change);
    }
}

fn validate(state: &State, changes: &[Change]) -> Result<(), RepositoryError> {
    // Running stock view so several decrements against one product within a
    // batch are checked cumulatively.
    let mut remaining_stock: HashMap<ProductId, u32> = HashMap::new();
    let mut staged_numbers: Vec<String> = Vec::new();

    for change in changes {
        match change {
            Change::DecrementStock { id, quantity } => {
                let available = match remaining_stock.get(id) {
                    Some(v) => *v,
                    None => state
                        .products
                        .get(id)
                        .map(|p| p.stock().value())
                        .ok_or_else(|| RepositoryError::MissingRow {
                            entity: "product",
                            id: id.to_string(),
                        })?,
                };
                if *quantity > available {
                    return Err(RepositoryError::StockConflict {
                        product_id: *id,
                        requested: *quantity,
                        available,
                    });
                }
                remaining_stock.insert(*id, available - quantity);
            }
            Change::AddOrder(order) => {
                let number = order.order_number().as_str();
                let duplicate = staged_numbers.iter().any(|n| n == number)
                    || state
                        .orders
                        .values()
                        .any(|o| o.order_number().as_str() == number);
                if duplicate {
                    return Err(RepositoryError::DuplicateOrderNumber(number.to_string()));
                }
                staged_numbers.push(number.to_string());
            }
            Change::UpdateProduct(product) => {
                require_row(
                    state.products.contains_key(&product.id()),
                    "product",
                    product.id(),
                )?;
            }
            Change::DeleteProduct(id) => {
                require_row(state.products.contains_key(id), "product", *id)?;
            }
            Change::UpdateOrder(order) => {
                require_row(state.orders.contains_key(&order.id()), "order", order.id())?;
            }
            Change::DeleteOrder(id) => {
                require_row(state.orders.contains_key(id), "order", *id)?;
            }
            Change::UpdatePayment(payment) => {
                require_row(
                    state.payments.contains_key(&payment.id()),
                    "payment",
                    payment.id(),
                )?;
            }
            Change::DeletePayment(id) => {
                require_row(state.payments.contains_key(id), "payment", *id)?;
            }
            Change::UpdateShipment(shipment) => {
                require_row(
                    state.shipments.contains_key(&shipment.id()),
                    "shipment",
                    shipment.id(),
                )?;
            }
            Change::DeleteShipment(id) => {
                require_row(state.shipments.contains_key(id), "shipment", *id)?;
            }
            Change::AddProduct(_) | Change::AddPayment(_) | Change::AddShipment(_) => {}
        }
    }
    Ok(())
}

fn require_row(
    exists: bool,
    entity: &'static str,
    id: impl std::fmt::Display,
) -> Result<(), RepositoryError> {
    if exists {
        Ok(())
    } else {
        Err(RepositoryError::MissingRow {
            entity,
            id: id.to_string(),
        })
    }
}

// Recorded events are transient; the stored row never carries them, so
// each inserted aggregate is drained before it lands in state.
fn apply(state: &mut State, change: Change) {
    match change {
        Change::AddProduct(mut p) | Change::UpdateProduct(mut p) => {
            p.take_events();
            state.products.insert(p.id(), p);
        }
        Change::DeleteProduct(id) => {
            state.products.remove(&id);
        }
        Change::DecrementStock { id, quantity } => {
            if let Some(product) = state.products.get_mut(&id) {
                // Validated above; the decrement cannot underflow here.
                if product.decrease_stock(quantity, "store").is_err() {
                    tracing::error!(product_id = %id, quantity, "validated decrement underflowed");
                }
                product.take_events();
            }
        }
        Change::AddOrder(mut o) | Change::UpdateOrder(mut o) => {
            o.take_events();
            state.orders.insert(o.id(), o);
        }
        Change::DeleteOrder(id) => {
            state.orders.remove(&id);
        }
        Change::AddPayment(mut p) | Change::UpdatePayment(mut p) => {
            p.take_events();
            state.payments.insert(p.id(), p);
        }
        Change::DeletePayment(id) => {
            state.payments.remove(&id);
        }
        Change::AddShipment(mut s) | Change::UpdateShipment(mut s) => {
            s.take_events();
            state.shipments.insert(s.id(), s);
        }
        Change::DeleteShipment(id) => {
            state.shipments.remove(&id);
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemorySession {
    async fn commit(&self) -> RepositoryResult<u64> {
        let changes: Vec<Change> = self.pending.lock().await.drain(..).collect();
        if changes.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.write().await;
        // Validate the whole batch before touching anything; a failed batch
        // is discarded and state stays as it was.
        validate(&state, &changes)?;

        let affected = changes.len() as u64;
        for change in changes {
            apply(&mut state, change);
        }
        tracing::debug!(affected, "unit of work committed");
        Ok(affected)
    }
}

#[async_trait]
impl ProductRepository for InMemorySession {
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_product_with_children(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        // The in-memory representation always holds the full aggregate.
        self.get_product(id).await
    }

    async fn product_by_sku(&self, sku: &Sku) -> RepositoryResult<Option<Product>> {
        Ok(self
            .state
            .read()
            .await
            .products
            .values()
            .find(|p| p.sku() == sku)
            .cloned())
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn add_product(&self, product: Product) -> RepositoryResult<()> {
        self.stage(Change::AddProduct(product)).await;
        Ok(())
    }

    async fn update_product(&self, product: Product) -> RepositoryResult<()> {
        self.stage(Change::UpdateProduct(product)).await;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> RepositoryResult<()> {
        self.stage(Change::DeleteProduct(id)).await;
        Ok(())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> RepositoryResult<()> {
        self.stage(Change::DecrementStock { id, quantity }).await;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemorySession {
    async fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn get_order_with_details(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        self.get_order(id).await
    }

    async fn order_by_number(&self, number: &OrderNumber) -> RepositoryResult<Option<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .values()
            .find(|o| o.order_number() == number)
            .cloned())
    }

    async fn list_orders(&self) -> RepositoryResult<Vec<Order>> {
        Ok(self.state.read().await.orders.values().cloned().collect())
    }

    async fn order_references_product(&self, id: ProductId) -> RepositoryResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .values()
            .any(|o| o.details().iter().any(|d| d.product_id() == id)))
    }

    async fn add_order(&self, order: Order) -> RepositoryResult<()> {
        self.stage(Change::AddOrder(order)).await;
        Ok(())
    }

    async fn update_order(&self, order: Order) -> RepositoryResult<()> {
        self.stage(Change::UpdateOrder(order)).await;
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> RepositoryResult<()> {
        self.stage(Change::DeleteOrder(id)).await;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemorySession {
    async fn get_payment(&self, id: PaymentId) -> RepositoryResult<Option<Payment>> {
        Ok(self.state.read().await.payments.get(&id).cloned())
    }

    async fn payments_for_order(&self, order_id: OrderId) -> RepositoryResult<Vec<Payment>> {
        Ok(self
            .state
            .read()
            .await
            .payments
            .values()
            .filter(|p| p.order_id() == order_id)
            .cloned()
            .collect())
    }

    async fn list_payments(&self) -> RepositoryResult<Vec<Payment>> {
        Ok(self.state.read().await.payments.values().cloned().collect())
    }

    async fn add_payment(&self, payment: Payment) -> RepositoryResult<()> {
        self.stage(Change::AddPayment(payment)).await;
        Ok(())
    }

    async fn update_payment(&self, payment: Payment) -> RepositoryResult<()> {
        self.stage(Change::UpdatePayment(payment)).await;
        Ok(())
    }

    async fn delete_payment(&self, id: PaymentId) -> RepositoryResult<()> {
        self.stage(Change::DeletePayment(id)).await;
        Ok(())
    }
}

#[async_trait]
impl ShipmentRepository for InMemorySession {
    async fn get_shipment(&self, id: ShipmentId) -> RepositoryResult<Option<Shipment>> {
        Ok(self.state.read().await.shipments.get(&id).cloned())
    }

    async fn get_shipment_with_children(
        &self,
        id: ShipmentId,
    ) -> RepositoryResult<Option<Shipment>> {
        self.get_shipment(id).await
    }

    async fn shipment_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> RepositoryResult<Option<Shipment>> {
        Ok(self
            .state
            .read()
            .await
            .shipments
            .values()
            .find(|s| s.tracking_number() == tracking_number)
            .cloned())
    }

    async fn list_shipments(&self) -> RepositoryResult<Vec<Shipment>> {
        Ok(self.state.read().await.shipments.values().cloned().collect())
    }

    async fn add_shipment(&self, shipment: Shipment) -> RepositoryResult<()> {
        self.stage(Change::AddShipment(shipment)).await;
        Ok(())
    }

    async fn update_shipment(&self, shipment: Shipment) -> RepositoryResult<()> {
        self.stage(Change::UpdateShipment(shipment)).await;
        Ok(())
    }

    async fn delete_shipment(&self, id: ShipmentId) -> RepositoryResult<()> {
        self.stage(Change::DeleteShipment(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;

    use domain::{Address, Email, Money, Sku, StockQuantity};

    fn product(stock: u32) -> Product {
        Product::create(
            ProductId::new(),
            "Widget",
            None,
            Money::new(Decimal::new(1000, 2), "USD").unwrap(),
            Sku::new("WID001").unwrap(),
            StockQuantity::new(stock),
            2,
            "alice",
        )
    }

    fn order(seed: u64) -> Order {
        let mut rng = StdRng::seed_from_u64(seed);
        Order::place(
            OrderId::new(),
            OrderNumber::generate(Utc::now().date_naive(), &mut rng),
            "Jane Doe",
            Email::new("jane@example.com").unwrap(),
            Address::new("1 Main St", "Springfield", "IL", "62704", "USA").unwrap(),
            None,
            "alice",
        )
    }

    #[tokio::test]
    async fn staged_writes_are_invisible_until_commit() {
        let store = InMemoryStore::new();
        let session = store.begin();
        let p = product(10);
        let id = p.id();

        session.add_product(p).await.unwrap();
        assert!(session.get_product(id).await.unwrap().is_none());
        assert_eq!(session.pending_count().await, 1);

        let affected = session.commit().await.unwrap();
        assert_eq!(affected, 1);
        assert!(session.get_product(id).await.unwrap().is_some());
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn empty_commit_affects_nothing() {
        let store = InMemoryStore::new();
        assert_eq!(store.begin().commit().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sessions_stage_independently() {
        let store = InMemoryStore::new();
        let first = store.begin();
        let second = store.begin();

        first.add_product(product(1)).await.unwrap();
        assert_eq!(second.pending_count().await, 0);

        // Committing the empty session applies nothing.
        assert_eq!(second.commit().await.unwrap(), 0);
        assert_eq!(store.product_count().await, 0);

        assert_eq!(first.commit().await.unwrap(), 1);
        assert_eq!(store.product_count().await, 1);
    }

    #[tokio::test]
    async fn conditional_decrement_applies_when_stock_suffices() {
        let store = InMemoryStore::new();
        let p = product(10);
        let id = p.id();
        let session = store.begin();
        session.add_product(p).await.unwrap();
        session.commit().await.unwrap();

        let session = store.begin();
        session.decrement_stock(id, 7).await.unwrap();
        session.commit().await.unwrap();

        let stored = store.begin().get_product(id).await.unwrap().unwrap();
        assert_eq!(stored.stock().value(), 3);
    }

    #[tokio::test]
    async fn conditional_decrement_conflict_discards_whole_batch() {
        let store = InMemoryStore::new();
        let p = product(5);
        let id = p.id();
        let setup = store.begin();
        setup.add_product(p).await.unwrap();
        setup.commit().await.unwrap();

        // Stage an order insert plus an oversized decrement in one batch.
        let session = store.begin();
        let o = order(1);
        let order_id = o.id();
        session.add_order(o).await.unwrap();
        session.decrement_stock(id, 6).await.unwrap();

        let err = session.commit().await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::StockConflict {
                requested: 6,
                available: 5,
                ..
            }
        ));

        // Nothing applied, batch discarded.
        assert!(session.get_order(order_id).await.unwrap().is_none());
        assert_eq!(
            session.get_product(id).await.unwrap().unwrap().stock().value(),
            5
        );
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn decrements_within_one_batch_are_cumulative() {
        let store = InMemoryStore::new();
        let p = product(5);
        let id = p.id();
        let setup = store.begin();
        setup.add_product(p).await.unwrap();
        setup.commit().await.unwrap();

        let session = store.begin();
        session.decrement_stock(id, 3).await.unwrap();
        session.decrement_stock(id, 3).await.unwrap();

        let err = session.commit().await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::StockConflict {
                requested: 3,
                available: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_order_number_is_rejected() {
        let store = InMemoryStore::new();
        let first = order(7);
        let session = store.begin();
        session.add_order(first.clone()).await.unwrap();
        session.commit().await.unwrap();

        // Same seed produces the same order number.
        let second = order(7);
        assert_eq!(first.order_number(), second.order_number());
        let session = store.begin();
        session.add_order(second).await.unwrap();

        let err = session.commit().await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateOrderNumber(_)));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_fails_commit() {
        let store = InMemoryStore::new();
        let session = store.begin();
        session.update_product(product(1)).await.unwrap();
        let err = session.commit().await.unwrap_err();
        assert!(matches!(err, RepositoryError::MissingRow { .. }));
    }

    #[tokio::test]
    async fn natural_key_lookups() {
        let store = InMemoryStore::new();
        let session = store.begin();
        let p = product(3);
        let sku = p.sku().clone();
        session.add_product(p).await.unwrap();
        let o = order(2);
        let number = o.order_number().clone();
        session.add_order(o).await.unwrap();
        session.commit().await.unwrap();

        let reader = store.begin();
        assert!(reader.product_by_sku(&sku).await.unwrap().is_some());
        assert!(reader.order_by_number(&number).await.unwrap().is_some());
        assert!(
            reader
                .product_by_sku(&Sku::new("NOPE99").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_removes_committed_row() {
        let store = InMemoryStore::new();
        let session = store.begin();
        let p = product(3);
        let id = p.id();
        session.add_product(p).await.unwrap();
        session.commit().await.unwrap();

        let session = store.begin();
        session.delete_product(id).await.unwrap();
        session.commit().await.unwrap();
        assert!(store.begin().get_product(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_aggregates_carry_no_recorded_events() {
        let store = InMemoryStore::new();
        let p = product(3);
        let id = p.id();
        assert!(!p.events().is_empty());

        let session = store.begin();
        session.add_product(p).await.unwrap();
        session.commit().await.unwrap();

        let stored = store.begin().get_product(id).await.unwrap().unwrap();
        assert!(stored.events().is_empty());
    }
}
