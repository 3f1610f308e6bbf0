//! Product aggregate implementation.

use std::collections::BTreeMap;

use common::ProductId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{AggregateRoot, Audit};
use crate::error::DomainError;
use crate::values::{Money, Sku, StockQuantity};

use super::ProductEvent;

/// An image attached to a product.
///
/// At most one image per product is primary at a time; the aggregate
/// enforces this on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    id: Uuid,
    url: String,
    alt_text: Option<String>,
    is_primary: bool,
}

impl ProductImage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn alt_text(&self) -> Option<&str> {
        self.alt_text.as_deref()
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// Product aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Money,
    sku: Sku,
    stock: StockQuantity,
    low_stock_threshold: u32,
    is_active: bool,
    details: BTreeMap<String, String>,
    images: Vec<ProductImage>,
    audit: Audit,
    #[serde(skip)]
    events: Vec<ProductEvent>,
}

impl AggregateRoot for Product {
    type Event = ProductEvent;

    fn events(&self) -> &[ProductEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }
}

// Query methods
impl Product {
    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn stock(&self) -> StockQuantity {
        self.stock
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    pub fn images(&self) -> &[ProductImage] {
        &self.images
    }

    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|i| i.is_primary)
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    /// Returns true if stock is at or below the low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock.is_at_or_below(self.low_stock_threshold)
    }
}

// Behavior methods
impl Product {
    /// Creates a new active product.
    pub fn create(
        id: ProductId,
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
        sku: Sku,
        stock: StockQuantity,
        low_stock_threshold: u32,
        actor: &str,
    ) -> Self {
        let name = name.into();
        let mut product = Self {
            id,
            name: name.clone(),
            description,
            price,
            sku: sku.clone(),
            stock,
            low_stock_threshold,
            is_active: true,
            details: BTreeMap::new(),
            images: Vec::new(),
            audit: Audit::new(actor),
            events: Vec::new(),
        };
        product.record(ProductEvent::created(id, sku.as_str(), name));
        product
    }

    /// Updates the product's descriptive attributes.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
        low_stock_threshold: u32,
        is_active: bool,
        actor: &str,
    ) {
        self.name = name.into();
        self.description = description;
        self.price = price;
        self.low_stock_threshold = low_stock_threshold;
        self.is_active = is_active;
        self.audit.touch(actor);
        self.record(ProductEvent::updated(self.id));
    }

    /// Sets the stock level to an absolute value.
    pub fn update_stock(&mut self, new_stock: StockQuantity, actor: &str) {
        let old = self.stock.value();
        self.stock = new_stock;
        self.audit.touch(actor);
        self.record(ProductEvent::stock_changed(self.id, old, new_stock.value()));
        self.signal_if_low();
    }

    /// Adds stock.
    pub fn increase_stock(&mut self, amount: u32, actor: &str) {
        let old = self.stock.value();
        self.stock = self.stock.add(amount);
        self.audit.touch(actor);
        self.record(ProductEvent::stock_changed(self.id, old, self.stock.value()));
    }

    /// Removes stock; going below zero is an invariant violation.
    ///
    /// Dropping to or below the low-stock threshold records a
    /// `ProductStockLow` event — a signal, not an error.
    pub fn decrease_stock(&mut self, amount: u32, actor: &str) -> Result<(), DomainError> {
        let old = self.stock.value();
        self.stock = self.stock.subtract(amount).map_err(DomainError::Invariant)?;
        self.audit.touch(actor);
        self.record(ProductEvent::stock_changed(self.id, old, self.stock.value()));
        self.signal_if_low();
        Ok(())
    }

    /// Adds or replaces a key/value detail.
    pub fn add_detail(&mut self, key: impl Into<String>, value: impl Into<String>, actor: &str) {
        self.details.insert(key.into(), value.into());
        self.audit.touch(actor);
        self.record(ProductEvent::updated(self.id));
    }

    /// Removes a detail; removing an absent key is a no-op.
    pub fn remove_detail(&mut self, key: &str, actor: &str) -> bool {
        let removed = self.details.remove(key).is_some();
        if removed {
            self.audit.touch(actor);
            self.record(ProductEvent::updated(self.id));
        }
        removed
    }

    /// Adds an image and returns its id.
    ///
    /// Inserting a primary image demotes any existing primary image.
    pub fn add_image(
        &mut self,
        url: impl Into<String>,
        alt_text: Option<String>,
        is_primary: bool,
        actor: &str,
    ) -> Uuid {
        if is_primary {
            for image in &mut self.images {
                image.is_primary = false;
            }
        }
        let image = ProductImage {
            id: Uuid::new_v4(),
            url: url.into(),
            alt_text,
            is_primary,
        };
        let id = image.id;
        self.images.push(image);
        self.audit.touch(actor);
        self.record(ProductEvent::updated(self.id));
        id
    }

    /// Removes an image; removing an unknown id is a no-op.
    pub fn remove_image(&mut self, image_id: Uuid, actor: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|i| i.id != image_id);
        let removed = self.images.len() < before;
        if removed {
            self.audit.touch(actor);
            self.record(ProductEvent::updated(self.id));
        }
        removed
    }

    /// Makes the product orderable.
    pub fn activate(&mut self, actor: &str) {
        self.is_active = true;
        self.audit.touch(actor);
        self.record(ProductEvent::updated(self.id));
    }

    /// Withdraws the product from ordering.
    pub fn deactivate(&mut self, actor: &str) {
        self.is_active = false;
        self.audit.touch(actor);
        self.record(ProductEvent::updated(self.id));
    }

    fn signal_if_low(&mut self) {
        if self.is_low_stock() {
            self.record(ProductEvent::stock_low(
                self.id,
                self.stock.value(),
                self.low_stock_threshold,
            ));
        }
    }

    fn record(&mut self, event: ProductEvent) {
        self.events.push(event);
    }
}

impl Product {
    /// Returns an error unless at least `requested` units are in stock.
    pub fn ensure_stock_available(&self, requested: u32) -> Result<(), DomainError> {
        if requested > self.stock.value() {
            return Err(DomainError::InsufficientStock {
                product_id: self.id,
                requested,
                available: self.stock.value(),
            });
        }
        Ok(())
    }
}
