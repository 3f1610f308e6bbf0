//! Payment commands and their handlers.

use std::sync::Arc;

use common::{OrderId, PaymentId};
use rust_decimal::Decimal;

use domain::{
    DomainError, Money, OrderRepository, Payment, PaymentRepository, PaymentStatus, Store,
    UnitOfWork, ValidationErrors,
};

use crate::command::{
    Command, ensure_valid, optional_text, require_currency, require_non_negative, require_text,
};

/// Command to create a payment against an order.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: Option<String>,
    pub actor: String,
}

impl Command for CreatePayment {
    fn validate(&self, report: &mut ValidationErrors) {
        require_non_negative(report, "amount", self.amount);
        require_currency(report, "currency", &self.currency);
        optional_text(report, "payment_method", self.payment_method.as_deref(), 100);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to move a payment to a new status.
#[derive(Debug, Clone)]
pub struct UpdatePaymentStatus {
    pub payment_id: PaymentId,
    pub new_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub actor: String,
}

impl Command for UpdatePaymentStatus {
    fn validate(&self, report: &mut ValidationErrors) {
        optional_text(report, "transaction_id", self.transaction_id.as_deref(), 100);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command handlers for the payment aggregate.
pub struct PaymentService<S> {
    store: Arc<S>,
}

impl<S: Store> PaymentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a pending payment; the order must exist.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn create_payment(&self, cmd: CreatePayment) -> Result<Payment, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        db.get_order(cmd.order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(cmd.order_id))?;

        let amount = Money::new(cmd.amount, &cmd.currency)?;
        let payment = Payment::create(
            PaymentId::new(),
            cmd.order_id,
            amount,
            cmd.payment_method,
            &cmd.actor,
        );

        db.add_payment(payment.clone()).await?;
        db.commit().await?;
        metrics::counter!("payments_created_total").increment(1);
        Ok(payment)
    }

    #[tracing::instrument(skip(self, cmd), fields(payment_id = %cmd.payment_id, new_status = %cmd.new_status))]
    pub async fn update_status(&self, cmd: UpdatePaymentStatus) -> Result<Payment, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut payment = db
            .get_payment(cmd.payment_id)
            .await?
            .ok_or(DomainError::PaymentNotFound(cmd.payment_id))?;
        payment.update_status(cmd.new_status, cmd.transaction_id, &cmd.actor)?;

        db.update_payment(payment.clone()).await?;
        db.commit().await?;
        Ok(payment)
    }

    /// Loads a payment by id for the read side.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.store.begin().get_payment(id).await?)
    }

    /// Returns all payments recorded against an order.
    pub async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, DomainError> {
        Ok(self.store.begin().payments_for_order(order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    use crate::command::AddressInput;
    use crate::orders::{OrderService, PlaceOrder};
    use crate::products::{CreateProduct, ProductService};

    async fn store_with_order() -> (Arc<InMemoryStore>, OrderId) {
        let store = Arc::new(InMemoryStore::new());
        let products = ProductService::new(store.clone());
        let orders = OrderService::new(store.clone());

        let product = products
            .create_product(CreateProduct {
                name: "Widget".to_string(),
                description: None,
                price: Decimal::new(1000, 2),
                currency: "USD".to_string(),
                sku: "WID001".to_string(),
                initial_stock: 10,
                low_stock_threshold: 2,
                actor: "alice".to_string(),
            })
            .await
            .unwrap();
        let order = orders
            .place_order(PlaceOrder {
                customer_name: "Jane Doe".to_string(),
                customer_email: "jane@example.com".to_string(),
                shipping_address: AddressInput {
                    street: "1 Main St".to_string(),
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                    postal_code: "62704".to_string(),
                    country: "USA".to_string(),
                },
                lines: vec![crate::orders::OrderLine {
                    product_id: product.id(),
                    quantity: 1,
                }],
                notes: None,
                actor: "alice".to_string(),
            })
            .await
            .unwrap();
        (store, order.id())
    }

    fn create_cmd(order_id: OrderId) -> CreatePayment {
        CreatePayment {
            order_id,
            amount: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            payment_method: Some("card".to_string()),
            actor: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn create_payment_requires_existing_order() {
        let (store, _) = store_with_order().await;
        let service = PaymentService::new(store);

        let err = service
            .create_payment(create_cmd(OrderId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn payment_lifecycle_to_successful() {
        let (store, order_id) = store_with_order().await;
        let service = PaymentService::new(store);

        let payment = service.create_payment(create_cmd(order_id)).await.unwrap();
        assert_eq!(payment.status(), PaymentStatus::Pending);

        let payment = service
            .update_status(UpdatePaymentStatus {
                payment_id: payment.id(),
                new_status: PaymentStatus::Successful,
                transaction_id: Some("tx-123".to_string()),
                actor: "alice".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(payment.status(), PaymentStatus::Successful);
        assert_eq!(payment.transaction_id(), Some("tx-123"));

        // Terminal now; a further transition is rejected.
        let err = service
            .update_status(UpdatePaymentStatus {
                payment_id: payment.id(),
                new_status: PaymentStatus::Failed,
                transaction_id: None,
                actor: "alice".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TerminalStatus { .. }));
    }

    #[tokio::test]
    async fn self_transition_is_rejected() {
        let (store, order_id) = store_with_order().await;
        let service = PaymentService::new(store);
        let payment = service.create_payment(create_cmd(order_id)).await.unwrap();

        let err = service
            .update_status(UpdatePaymentStatus {
                payment_id: payment.id(),
                new_status: PaymentStatus::Pending,
                transaction_id: None,
                actor: "alice".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyInStatus(_)));
    }

    #[tokio::test]
    async fn payments_for_order_filters_by_order() {
        let (store, order_id) = store_with_order().await;
        let service = PaymentService::new(store);
        service.create_payment(create_cmd(order_id)).await.unwrap();

        assert_eq!(service.payments_for_order(order_id).await.unwrap().len(), 1);
        assert!(
            service
                .payments_for_order(OrderId::new())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
