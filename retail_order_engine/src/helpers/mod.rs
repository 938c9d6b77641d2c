use rand::Rng;

use crate::db_types::OrderId;

/// Generates a fresh opaque order id: 20 random lowercase hex characters.
///
/// Collisions are guarded by the unique constraint on the orders table, not by this
/// function; a duplicate insert surfaces as an error and the caller retries.
pub fn new_order_id() -> OrderId {
    let mut rng = rand::thread_rng();
    let id: String = (0..20)
        .map(|_| char::from_digit(rng.gen_range(0..16u32), 16).expect("digit is always < 16"))
        .collect();
    OrderId(id)
}
