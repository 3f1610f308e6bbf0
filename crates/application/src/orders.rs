//! Order commands and their handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use common::{OrderId, ProductId};

use domain::{
    DomainError, Email, Order, OrderNumber, OrderRepository, OrderStatus, Product,
    ProductRepository, RepositoryError, Store, UnitOfWork, ValidationErrors,
};

use crate::command::{
    AddressInput, Command, ensure_valid, optional_text, require_email_shape, require_positive,
    require_text,
};

/// One requested line of an order.
///
/// A line list may reference the same product more than once; the handler
/// sums quantities per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Command to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: AddressInput,
    pub lines: Vec<OrderLine>,
    pub notes: Option<String>,
    pub actor: String,
}

impl Command for PlaceOrder {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "customer_name", &self.customer_name, 200);
        require_email_shape(report, "customer_email", &self.customer_email);
        self.shipping_address.validate(report);
        optional_text(report, "notes", self.notes.as_deref(), 1000);
        require_text(report, "actor", &self.actor, 100);
        if self.lines.is_empty() {
            report.push("lines", "must contain at least one line");
        }
        for line in &self.lines {
            require_positive(report, "lines.quantity", line.quantity);
        }
    }
}

/// Command to move an order to a new status.
#[derive(Debug, Clone)]
pub struct UpdateOrderStatus {
    pub order_id: OrderId,
    pub new_status: OrderStatus,
    pub actor: String,
}

impl Command for UpdateOrderStatus {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    pub order_id: OrderId,
    pub reason: String,
    pub actor: String,
}

impl Command for CancelOrder {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "reason", &self.reason, 500);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to update an order's customer info.
#[derive(Debug, Clone)]
pub struct UpdateOrderCustomerInfo {
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub actor: String,
}

impl Command for UpdateOrderCustomerInfo {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "customer_name", &self.customer_name, 200);
        require_email_shape(report, "customer_email", &self.customer_email);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to update an order's shipping address.
#[derive(Debug, Clone)]
pub struct UpdateOrderShippingAddress {
    pub order_id: OrderId,
    pub shipping_address: AddressInput,
    pub actor: String,
}

impl Command for UpdateOrderShippingAddress {
    fn validate(&self, report: &mut ValidationErrors) {
        self.shipping_address.validate(report);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to replace an order's notes.
#[derive(Debug, Clone)]
pub struct UpdateOrderNotes {
    pub order_id: OrderId,
    pub notes: Option<String>,
    pub actor: String,
}

impl Command for UpdateOrderNotes {
    fn validate(&self, report: &mut ValidationErrors) {
        optional_text(report, "notes", self.notes.as_deref(), 1000);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command handlers for the order aggregate.
pub struct OrderService<S> {
    store: Arc<S>,
}

impl<S: Store> OrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Places an order across one or more products.
    ///
    /// The workflow validates every product before mutating anything:
    /// requested quantities are summed per product, each product must exist,
    /// be active, and hold enough stock. Only then is the order built
    /// (merging duplicate lines and snapshotting prices) and each product's
    /// stock decremented. The decrements are staged as conditional writes,
    /// so a concurrent placement that wins the race surfaces here as
    /// insufficient stock and nothing is committed.
    #[tracing::instrument(skip(self, cmd), fields(lines = cmd.lines.len()))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Order, DomainError> {
        let started = Instant::now();
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut requested: BTreeMap<ProductId, u32> = BTreeMap::new();
        for line in &cmd.lines {
            *requested.entry(line.product_id).or_default() += line.quantity;
        }

        // Pass 1: every product must be orderable before any state changes.
        let mut products: HashMap<ProductId, Product> = HashMap::new();
        for (&product_id, &quantity) in &requested {
            let product = db
                .get_product(product_id)
                .await?
                .filter(Product::is_active)
                .ok_or(DomainError::ProductUnavailable(product_id))?;
            product.ensure_stock_available(quantity)?;
            products.insert(product_id, product);
        }

        // Pass 2: build the order with snapshots, then decrement stock.
        let email = Email::new(&cmd.customer_email)?;
        let address = cmd.shipping_address.to_address()?;
        let order_number = OrderNumber::generate(Utc::now().date_naive(), &mut rand::thread_rng());
        let mut order = Order::place(
            OrderId::new(),
            order_number,
            cmd.customer_name,
            email,
            address,
            cmd.notes,
            &cmd.actor,
        );
        for line in &cmd.lines {
            let product = &products[&line.product_id];
            order.add_detail(product, line.quantity, &cmd.actor)?;
        }

        for (&product_id, &quantity) in &requested {
            if let Some(product) = products.get_mut(&product_id) {
                product.decrease_stock(quantity, &cmd.actor)?;
                if product.is_low_stock() {
                    tracing::warn!(
                        product_id = %product_id,
                        stock = product.stock().value(),
                        threshold = product.low_stock_threshold(),
                        "order placement drove product stock to or below threshold"
                    );
                    metrics::counter!("product_low_stock_total").increment(1);
                }
            }
            db.decrement_stock(product_id, quantity).await?;
        }

        db.add_order(order.clone()).await?;

        // A conditional decrement that lost a concurrent race is insufficient
        // stock discovered late; the whole unit of work was rolled back.
        match db.commit().await {
            Ok(_) => {}
            Err(RepositoryError::StockConflict {
                product_id,
                requested,
                available,
            }) => {
                return Err(DomainError::InsufficientStock {
                    product_id,
                    requested,
                    available,
                });
            }
            Err(other) => return Err(other.into()),
        }

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("order_placement_seconds").record(started.elapsed().as_secs_f64());
        Ok(order)
    }

    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id, new_status = %cmd.new_status))]
    pub async fn update_status(&self, cmd: UpdateOrderStatus) -> Result<Order, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut order = load(&db, cmd.order_id).await?;
        order.update_status(cmd.new_status, &cmd.actor)?;

        db.update_order(order.clone()).await?;
        db.commit().await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn cancel_order(&self, cmd: CancelOrder) -> Result<Order, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut order = load(&db, cmd.order_id).await?;
        order.cancel(cmd.reason, &cmd.actor)?;

        db.update_order(order.clone()).await?;
        db.commit().await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(order)
    }

    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_customer_info(
        &self,
        cmd: UpdateOrderCustomerInfo,
    ) -> Result<Order, DomainError> {
        ensure_valid(&cmd)?;

        let email = Email::new(&cmd.customer_email)?;
        let db = self.store.begin();
        let mut order = load(&db, cmd.order_id).await?;
        order.update_customer_info(cmd.customer_name, email, &cmd.actor)?;

        db.update_order(order.clone()).await?;
        db.commit().await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_shipping_address(
        &self,
        cmd: UpdateOrderShippingAddress,
    ) -> Result<Order, DomainError> {
        ensure_valid(&cmd)?;

        let address = cmd.shipping_address.to_address()?;
        let db = self.store.begin();
        let mut order = load(&db, cmd.order_id).await?;
        order.update_shipping_address(address, &cmd.actor)?;

        db.update_order(order.clone()).await?;
        db.commit().await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_notes(&self, cmd: UpdateOrderNotes) -> Result<Order, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut order = load(&db, cmd.order_id).await?;
        order.update_notes(cmd.notes, &cmd.actor)?;

        db.update_order(order.clone()).await?;
        db.commit().await?;
        Ok(order)
    }

    /// Loads an order by id for the read side.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.begin().get_order_with_details(id).await?)
    }

    /// Returns all orders for the read side.
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.begin().list_orders().await?)
    }
}

async fn load(db: &impl OrderRepository, id: OrderId) -> Result<Order, DomainError> {
    db.get_order_with_details(id)
        .await?
        .ok_or(DomainError::OrderNotFound(id))
}
