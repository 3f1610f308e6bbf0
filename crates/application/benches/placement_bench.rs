use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;

use application::{
    AddressInput, CreateProduct, OrderLine, OrderService, PlaceOrder, ProductService,
};
use common::ProductId;
use store::InMemoryStore;

fn address() -> AddressInput {
    AddressInput {
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        postal_code: "62704".to_string(),
        country: "USA".to_string(),
    }
}

async fn seed_product(store: &Arc<InMemoryStore>, sku: &str) -> ProductId {
    let products = ProductService::new(store.clone());
    products
        .create_product(CreateProduct {
            name: format!("Bench {sku}"),
            description: None,
            price: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            sku: sku.to_string(),
            initial_stock: u32::MAX,
            low_stock_threshold: 0,
            actor: "bench".to_string(),
        })
        .await
        .unwrap()
        .id()
}

fn bench_place_order_single_line(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let product_id = rt.block_on(seed_product(&store, "BENCH001"));
    let orders = OrderService::new(store);

    c.bench_function("application/place_order_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                orders
                    .place_order(PlaceOrder {
                        customer_name: "Jane Doe".to_string(),
                        customer_email: "jane@example.com".to_string(),
                        shipping_address: address(),
                        lines: vec![OrderLine {
                            product_id,
                            quantity: 1,
                        }],
                        notes: None,
                        actor: "bench".to_string(),
                    })
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_place_order_five_products(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let product_ids: Vec<ProductId> = rt.block_on(async {
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(seed_product(&store, &format!("BENCH10{i}")).await);
        }
        ids
    });
    let orders = OrderService::new(store);

    c.bench_function("application/place_order_five_products", |b| {
        b.iter(|| {
            rt.block_on(async {
                orders
                    .place_order(PlaceOrder {
                        customer_name: "Jane Doe".to_string(),
                        customer_email: "jane@example.com".to_string(),
                        shipping_address: address(),
                        lines: product_ids
                            .iter()
                            .map(|&product_id| OrderLine {
                                product_id,
                                quantity: 2,
                            })
                            .collect(),
                        notes: None,
                        actor: "bench".to_string(),
                    })
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_place_order_single_line,
    bench_place_order_five_products
);
criterion_main!(benches);
