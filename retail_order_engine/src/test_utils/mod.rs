//! Helpers for exercising the engine against a real SQLite database.

use std::env;

use log::*;

use crate::{
    db_types::{Money, ProductId, ShippingAddress},
    InventoryManagement,
    SqliteDatabase,
};

/// Creates a fresh file-backed database in the system temp directory, runs the
/// migrations, and returns a connected handle. Each call gets its own database, so tests
/// never interfere with one another.
pub async fn prepare_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    let url = random_db_path();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/ros_test_store_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

pub async fn seed_product(db: &SqliteDatabase, id: &str, name: &str, price_cents: i64, stock: i64) {
    db.upsert_product(&ProductId::from(id), name, Money::from_cents(price_cents), stock)
        .await
        .expect("Error seeding product");
}

pub async fn stock_of(db: &SqliteDatabase, id: &str) -> i64 {
    db.fetch_product(&ProductId::from(id))
        .await
        .expect("Error fetching product")
        .expect("Product should exist")
        .stock
}

pub fn test_address() -> ShippingAddress {
    ShippingAddress {
        address: "221B Baker Street".to_string(),
        city: "London".to_string(),
        postal_code: "NW1 6XE".to_string(),
        country: "UK".to_string(),
    }
}
