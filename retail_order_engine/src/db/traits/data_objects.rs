use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Outcome of a single conditional stock decrement.
///
/// `NotFound` and `Insufficient` are reported as data rather than errors because the
/// reservation flow needs to distinguish them from genuine storage failures when deciding
/// what to compensate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was sufficient and has been decremented.
    Applied,
    /// No product with the given id exists.
    NotFound,
    /// The product exists but only `available` units remain.
    Insufficient { available: i64 },
}

/// Outcome of the conditional "mark paid" update.
///
/// The distinction matters for webhook processing: `AlreadyPaid` and `NotFound` are both
/// acknowledged to the gateway without further action, because redelivery can never
/// resolve them.
#[derive(Debug, Clone)]
pub enum MarkPaidOutcome {
    /// The order transitioned from unpaid to paid in this call.
    Paid(Order),
    /// The order was already paid; nothing changed.
    AlreadyPaid(Order),
    /// No order with the given id exists.
    NotFound,
}

/// A payment intent handle, as the engine sees it. The gateway owns the real object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}
