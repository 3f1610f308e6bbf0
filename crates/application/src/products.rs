//! Product commands and their handlers.

use std::sync::Arc;

use common::ProductId;
use rust_decimal::Decimal;
use uuid::Uuid;

use domain::{
    DomainError, Money, OrderRepository, Product, ProductRepository, Sku, StockQuantity, Store,
    UnitOfWork, ValidationErrors,
};

use crate::command::{
    Command, ensure_valid, optional_text, require_currency, require_non_negative, require_positive,
    require_text,
};

/// Command to create a product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub sku: String,
    pub initial_stock: u32,
    pub low_stock_threshold: u32,
    pub actor: String,
}

impl Command for CreateProduct {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "name", &self.name, 200);
        optional_text(report, "description", self.description.as_deref(), 2000);
        require_non_negative(report, "price", self.price);
        require_currency(report, "currency", &self.currency);
        require_text(report, "sku", &self.sku, 20);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to update a product's attributes.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub low_stock_threshold: u32,
    pub is_active: bool,
    pub actor: String,
}

impl Command for UpdateProduct {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "name", &self.name, 200);
        optional_text(report, "description", self.description.as_deref(), 2000);
        require_non_negative(report, "price", self.price);
        require_currency(report, "currency", &self.currency);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to set a product's stock to an absolute level.
#[derive(Debug, Clone)]
pub struct UpdateProductStock {
    pub product_id: ProductId,
    pub stock: u32,
    pub actor: String,
}

impl Command for UpdateProductStock {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to add stock.
#[derive(Debug, Clone)]
pub struct IncreaseProductStock {
    pub product_id: ProductId,
    pub amount: u32,
    pub actor: String,
}

impl Command for IncreaseProductStock {
    fn validate(&self, report: &mut ValidationErrors) {
        require_positive(report, "amount", self.amount);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to remove stock.
#[derive(Debug, Clone)]
pub struct DecreaseProductStock {
    pub product_id: ProductId,
    pub amount: u32,
    pub actor: String,
}

impl Command for DecreaseProductStock {
    fn validate(&self, report: &mut ValidationErrors) {
        require_positive(report, "amount", self.amount);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to add or replace a key/value detail.
#[derive(Debug, Clone)]
pub struct AddProductDetail {
    pub product_id: ProductId,
    pub key: String,
    pub value: String,
    pub actor: String,
}

impl Command for AddProductDetail {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "key", &self.key, 100);
        require_text(report, "value", &self.value, 500);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to remove a detail by key.
#[derive(Debug, Clone)]
pub struct RemoveProductDetail {
    pub product_id: ProductId,
    pub key: String,
    pub actor: String,
}

impl Command for RemoveProductDetail {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "key", &self.key, 100);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to add an image.
#[derive(Debug, Clone)]
pub struct AddProductImage {
    pub product_id: ProductId,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub actor: String,
}

impl Command for AddProductImage {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "url", &self.url, 500);
        optional_text(report, "alt_text", self.alt_text.as_deref(), 200);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to remove an image by id.
#[derive(Debug, Clone)]
pub struct RemoveProductImage {
    pub product_id: ProductId,
    pub image_id: Uuid,
    pub actor: String,
}

impl Command for RemoveProductImage {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to delete a product.
#[derive(Debug, Clone)]
pub struct DeleteProduct {
    pub product_id: ProductId,
}

impl Command for DeleteProduct {
    fn validate(&self, _report: &mut ValidationErrors) {}
}

/// Command handlers for the product aggregate.
pub struct ProductService<S> {
    store: Arc<S>,
}

impl<S: Store> ProductService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, cmd), fields(sku = %cmd.sku))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let price = Money::new(cmd.price, &cmd.currency)?;
        let sku = Sku::new(&cmd.sku)?;
        let product = Product::create(
            ProductId::new(),
            cmd.name,
            cmd.description,
            price,
            sku,
            StockQuantity::new(cmd.initial_stock),
            cmd.low_stock_threshold,
            &cmd.actor,
        );

        let db = self.store.begin();
        db.add_product(product.clone()).await?;
        db.commit().await?;
        metrics::counter!("products_created_total").increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let price = Money::new(cmd.price, &cmd.currency)?;
        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.update(
            cmd.name,
            cmd.description,
            price,
            cmd.low_stock_threshold,
            cmd.is_active,
            &cmd.actor,
        );

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn update_stock(&self, cmd: UpdateProductStock) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.update_stock(StockQuantity::new(cmd.stock), &cmd.actor);
        warn_if_low(&product);

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn increase_stock(&self, cmd: IncreaseProductStock) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.increase_stock(cmd.amount, &cmd.actor);

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn decrease_stock(&self, cmd: DecreaseProductStock) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.decrease_stock(cmd.amount, &cmd.actor)?;
        warn_if_low(&product);

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn add_detail(&self, cmd: AddProductDetail) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.add_detail(cmd.key, cmd.value, &cmd.actor);

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn remove_detail(&self, cmd: RemoveProductDetail) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        if product.remove_detail(&cmd.key, &cmd.actor) {
            db.update_product(product.clone()).await?;
            db.commit().await?;
        }
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn add_image(&self, cmd: AddProductImage) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        product.add_image(cmd.url, cmd.alt_text, cmd.is_primary, &cmd.actor);

        db.update_product(product.clone()).await?;
        db.commit().await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn remove_image(&self, cmd: RemoveProductImage) -> Result<Product, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut product = load(&db, cmd.product_id).await?;
        if product.remove_image(cmd.image_id, &cmd.actor) {
            db.update_product(product.clone()).await?;
            db.commit().await?;
        }
        Ok(product)
    }

    /// Deletes a product unless any order references it.
    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub async fn delete_product(&self, cmd: DeleteProduct) -> Result<(), DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let product = load(&db, cmd.product_id).await?;
        if db.order_references_product(product.id()).await? {
            return Err(DomainError::ProductInUse(product.id()));
        }

        db.delete_product(product.id()).await?;
        db.commit().await?;
        Ok(())
    }

    /// Loads a product by id for the read side.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.store.begin().get_product_with_children(id).await?)
    }

    /// Returns all products for the read side.
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.begin().list_products().await?)
    }

}

async fn load(db: &impl ProductRepository, id: ProductId) -> Result<Product, DomainError> {
    db.get_product_with_children(id)
        .await?
        .ok_or(DomainError::ProductNotFound(id))
}

fn warn_if_low(product: &Product) {
    if product.is_low_stock() {
        tracing::warn!(
            product_id = %product.id(),
            stock = product.stock().value(),
            threshold = product.low_stock_threshold(),
            "product stock at or below threshold"
        );
        metrics::counter!("product_low_stock_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn service() -> ProductService<InMemoryStore> {
        ProductService::new(Arc::new(InMemoryStore::new()))
    }

    fn create_cmd() -> CreateProduct {
        CreateProduct {
            name: "Widget".to_string(),
            description: Some("A fine widget".to_string()),
            price: Decimal::new(1999, 2),
            currency: "USD".to_string(),
            sku: "WID001".to_string(),
            initial_stock: 10,
            low_stock_threshold: 3,
            actor: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn create_product_persists_and_returns_aggregate() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();

        assert_eq!(product.sku().as_str(), "WID001");
        let stored = service.get_product(product.id()).await.unwrap().unwrap();
        assert_eq!(stored.stock().value(), 10);
    }

    #[tokio::test]
    async fn create_product_rejects_invalid_fields() {
        let service = service();
        let cmd = CreateProduct {
            name: String::new(),
            currency: "US".to_string(),
            ..create_cmd()
        };
        let err = service.create_product(cmd).await.unwrap_err();
        match err {
            DomainError::Validation(errors) => assert_eq!(errors.violations().len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_missing_product_is_not_found() {
        let service = service();
        let cmd = UpdateProductStock {
            product_id: ProductId::new(),
            stock: 5,
            actor: "alice".to_string(),
        };
        let err = service.update_stock(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn stock_operations_roundtrip() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();
        let id = product.id();

        service
            .increase_stock(IncreaseProductStock {
                product_id: id,
                amount: 5,
                actor: "alice".to_string(),
            })
            .await
            .unwrap();
        let product = service
            .decrease_stock(DecreaseProductStock {
                product_id: id,
                amount: 12,
                actor: "alice".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(product.stock().value(), 3);
        assert!(product.is_low_stock());
    }

    #[tokio::test]
    async fn decrease_below_zero_is_invariant_error() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();

        let err = service
            .decrease_stock(DecreaseProductStock {
                product_id: product.id(),
                amount: 11,
                actor: "alice".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Invariant(_)));
    }

    #[tokio::test]
    async fn delete_unreferenced_product_succeeds() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();

        service
            .delete_product(DeleteProduct {
                product_id: product.id(),
            })
            .await
            .unwrap();
        assert!(service.get_product(product.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn image_and_detail_commands() {
        let service = service();
        let product = service.create_product(create_cmd()).await.unwrap();
        let id = product.id();

        service
            .add_detail(AddProductDetail {
                product_id: id,
                key: "color".to_string(),
                value: "red".to_string(),
                actor: "alice".to_string(),
            })
            .await
            .unwrap();
        let product = service
            .add_image(AddProductImage {
                product_id: id,
                url: "https://img/1.png".to_string(),
                alt_text: None,
                is_primary: true,
                actor: "alice".to_string(),
            })
            .await
            .unwrap();

        assert!(product.primary_image().is_some());

        let stored = service.get_product(id).await.unwrap().unwrap();
        assert_eq!(stored.details().get("color").map(String::as_str), Some("red"));
        assert_eq!(stored.images().len(), 1);
    }
}
