//! # Retail order server
//!
//! The HTTP surface over the retail order engine. It is responsible for:
//! * Accepting order placements and cart mutations from authenticated storefront clients.
//! * Creating payment intents against the external gateway.
//! * Receiving the gateway's webhook notifications, verifying their signatures against
//!   the raw request bytes, and handing verified events to the engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html)
//! for details.
//!
//! ## Authentication
//! Identity is owned by an upstream auth proxy, which asserts the caller via the
//! `x-user-id` and `x-user-roles` headers. This crate only reads those headers; it never
//! verifies credentials itself.

pub mod auth;
pub mod cart_routes;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod gateway_routes;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
