//! Retail Order Engine
//!
//! The engine turns shopping-cart submissions into durable orders while guaranteeing that
//! inventory is never oversold, and reconciles the payment gateway's asynchronous,
//! at-least-once webhook notifications into a consistent order state.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`], not exported directly). SQLite is the
//!    supported backend. Access goes through the storage traits ([`InventoryManagement`],
//!    [`OrderManagement`], [`CartManagement`]); the public data types live in [`db_types`].
//! 2. The engine public API: [`OrderFlowApi`] (placement and admin updates),
//!    [`InventoryApi`] (atomic reserve/release), [`PaymentFlowApi`] (intent creation and
//!    idempotent webhook application) and [`CartApi`] (lenient cart validation). Backends
//!    implement the storage traits; the payment gateway is wired in through
//!    [`PaymentGatewayClient`].
//!
//! The one invariant everything else hangs off: a product's stock count never goes below
//! zero, even under concurrent order placement. The storage layer enforces this with a
//! single conditional decrement statement; there is deliberately no check-then-write
//! anywhere in the engine.

mod db;
pub mod db_types;
pub mod helpers;
mod roe_api;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::{
    CartError,
    CartManagement,
    GatewayError,
    InventoryError,
    InventoryManagement,
    MarkPaidOutcome,
    OrderApiError,
    OrderManagement,
    PaymentApiError,
    PaymentGatewayClient,
    PaymentIntent,
    StockDecrement,
};
pub use roe_api::{
    cart_api::CartApi,
    inventory_api::{InventoryApi, Reservation, ReservedLine},
    order_flow_api::OrderFlowApi,
    payment_flow_api::PaymentFlowApi,
};
