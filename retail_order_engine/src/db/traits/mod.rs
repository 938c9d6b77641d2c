//! Interface contracts of the engine's storage backends and external collaborators.
//!
//! * [`InventoryManagement`] exposes the atomic per-product stock primitives that the
//!   reservation flow is built on.
//! * [`OrderManagement`] owns the durable order aggregate.
//! * [`CartManagement`] persists per-user carts.
//! * [`PaymentGatewayClient`] is the outbound contract with the payment gateway; the
//!   server provides a concrete client.
//!
//! Backends implement these traits; the APIs in the engine are generic over them, which is
//! also what makes the server's endpoint tests cheap to mock.

mod cart_management;
mod inventory_management;
mod order_management;
mod payment_gateway;

mod data_objects;

pub use cart_management::{CartError, CartManagement};
pub use data_objects::{MarkPaidOutcome, PaymentIntent, StockDecrement};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use payment_gateway::{GatewayError, PaymentApiError, PaymentGatewayClient};
