use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use ros_common::Money;

use crate::helpers::new_order_id;

//--------------------------------------     ProductId       ---------------------------------------------------------
/// A lightweight wrapper around the opaque product identifier assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
pub struct ProductId(pub String);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle status of an order.
///
/// The lifecycle is monotonic: a status never moves backwards, and `Delivered` and
/// `Cancelled` are terminal. `Cancelled` is only reachable through the administrative
/// override; nothing in the engine cancels orders automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum OrderStatusType {
    /// The order has been placed and stock reserved, but payment has not been confirmed.
    Pending,
    /// Payment has been confirmed and the order is being prepared.
    Processing,
    Shipped,
    Delivered,
    /// Administrative override.
    Cancelled,
}

impl OrderStatusType {
    fn rank(self) -> u8 {
        match self {
            OrderStatusType::Pending => 0,
            OrderStatusType::Processing => 1,
            OrderStatusType::Shipped => 2,
            OrderStatusType::Delivered => 3,
            OrderStatusType::Cancelled => 4,
        }
    }

    /// Whether an order in this status may move to `new_status`. Re-entering the same
    /// status is not a transition.
    pub fn can_transition_to(self, new_status: OrderStatusType) -> bool {
        use OrderStatusType::*;
        match (self, new_status) {
            (old, new) if old == new => false,
            (Delivered | Cancelled, _) => false,
            (_, Cancelled) => true,
            (old, new) => new.rank() > old.rank(),
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Shipped => write!(f, "Shipped"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        Role          ---------------------------------------------------------
/// Roles granted by the upstream identity service. The server trusts the auth proxy's
/// role headers; the engine only defines the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      Product        ---------------------------------------------------------
/// A catalog product, as far as this engine cares about it. The catalog service owns the
/// record; this engine reads it for snapshots and mutates nothing but `stock`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------  ShippingAddress     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

//--------------------------------------     OrderItem       ---------------------------------------------------------
/// A line item as stored on an order. Name, price and image are snapshots taken at order
/// time so that later catalog edits do not rewrite order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
}

//--------------------------------------  LineItemRequest     ---------------------------------------------------------
/// A requested line item, before the engine has snapshotted product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: String,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    #[sqlx(flatten)]
    #[serde(rename = "shippingAddress")]
    pub shipping: ShippingAddress,
    pub total_price: Money,
    pub payment_method: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// A freshly generated opaque id, unique across all orders.
    pub order_id: OrderId,
    /// The user placing the order, as asserted by the identity collaborator.
    pub user_id: String,
    /// The requested line items. Quantities must be >= 1; product details are snapshotted
    /// by the engine, not trusted from the caller.
    pub items: Vec<LineItemRequest>,
    pub shipping: ShippingAddress,
    pub total_price: Money,
    pub payment_method: String,
}

impl NewOrder {
    pub fn new(
        user_id: impl Into<String>,
        items: Vec<LineItemRequest>,
        shipping: ShippingAddress,
        total_price: Money,
    ) -> Self {
        Self {
            order_id: new_order_id(),
            user_id: user_id.into(),
            items,
            shipping,
            total_price,
            payment_method: "card".to_string(),
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = order_id;
        self
    }
}

//--------------------------------------    OrderUpdate      ---------------------------------------------------------
/// The subset of order fields the administrative update path may change. `paid_at` is
/// filled in by the engine when `is_paid` flips to true; callers never set it.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatusType>,
    pub is_paid: Option<bool>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_paid(mut self, is_paid: bool) -> Self {
        self.is_paid = Some(is_paid);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.is_paid.is_none() && self.paid_at.is_none()
    }
}

//--------------------------------------     CartItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
}

//--------------------------------------    NewCartItem      ---------------------------------------------------------
/// A cart item as submitted by a client: product reference and requested quantity only.
/// Everything else is re-snapshotted from the catalog during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl NewCartItem {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

//--------------------------------------        Cart        ---------------------------------------------------------
/// A user's cart. One per user; created lazily on first access.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,
    #[sqlx(skip)]
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}
