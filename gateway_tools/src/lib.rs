//! Client-side tooling for the external payment gateway.
//!
//! The gateway is consumed through two surfaces only:
//! * The REST API, used to create payment intents for orders ([`GatewayApi`]).
//! * The webhook contract, used by the gateway to notify us of intent status changes
//!   ([`GatewayEvent`] plus the HMAC helpers in [`helpers`]).
//!
//! Everything else about the gateway (how it charges cards, retries, etc.) is its own business.

mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{
    GatewayEvent,
    GatewayEventObject,
    PaymentIntent,
    EVENT_PAYMENT_SUCCEEDED,
    ORDER_ID_METADATA_KEY,
    WEBHOOK_SIGNATURE_HEADER,
};
pub use error::GatewayApiError;
