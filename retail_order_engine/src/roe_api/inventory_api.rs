use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{InventoryError, InventoryManagement, StockDecrement},
    db_types::{LineItemRequest, Product, ProductId},
};

/// One reserved line of stock: this many units of this product have been decremented and
/// are owed back if the order they were reserved for never materializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// The result of a successful multi-item stock reservation.
///
/// A reservation is either consumed by a committed order, or released. Releasing twice is
/// a no-op, which is what lets callers release defensively on every failure path.
#[derive(Debug)]
pub struct Reservation {
    lines: Vec<ReservedLine>,
    released: bool,
}

impl Reservation {
    pub fn lines(&self) -> &[ReservedLine] {
        &self.lines
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// `InventoryApi` owns the reserve/release pair that the order placement flow is built on.
pub struct InventoryApi<B> {
    db: B,
}

impl<B> Debug for InventoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventoryApi")
    }
}

impl<B> InventoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> InventoryApi<B>
where B: InventoryManagement
{
    /// Reserves stock for every requested line item, all or nothing.
    ///
    /// Items are decremented one at a time; each decrement is atomic at the storage
    /// layer. If any item fails (`ProductNotFound` or `InsufficientStock`), every item
    /// already decremented in this call is restored, in reverse order, before the error
    /// is returned. There is no visible partial effect.
    pub async fn reserve(&self, items: &[LineItemRequest]) -> Result<Reservation, InventoryError> {
        let mut reserved: Vec<ReservedLine> = Vec::with_capacity(items.len());
        for item in items {
            let outcome = match self.db.decrement_stock(&item.product_id, item.quantity).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.unwind(&mut reserved).await;
                    return Err(e);
                },
            };
            match outcome {
                StockDecrement::Applied => {
                    reserved.push(ReservedLine { product_id: item.product_id.clone(), quantity: item.quantity });
                },
                StockDecrement::NotFound => {
                    debug!("📦️ Product {} not found. Unwinding {} reserved lines.", item.product_id, reserved.len());
                    self.unwind(&mut reserved).await;
                    return Err(InventoryError::ProductNotFound(item.product_id.clone()));
                },
                StockDecrement::Insufficient { available } => {
                    debug!(
                        "📦️ Product {} has {available} units, {} requested. Unwinding {} reserved lines.",
                        item.product_id,
                        item.quantity,
                        reserved.len()
                    );
                    self.unwind(&mut reserved).await;
                    return Err(InventoryError::InsufficientStock {
                        product_id: item.product_id.clone(),
                        available,
                        requested: item.quantity,
                    });
                },
            }
        }
        trace!("📦️ Reserved {} lines", reserved.len());
        Ok(Reservation { lines: reserved, released: false })
    }

    /// Releases a reservation, returning its stock. Idempotent: releasing a reservation
    /// that has already been released does nothing.
    pub async fn release(&self, reservation: &mut Reservation) {
        if reservation.released {
            debug!("📦️ Reservation already released. Nothing to do.");
            return;
        }
        let count = reservation.lines.len();
        self.unwind(&mut reservation.lines).await;
        reservation.released = true;
        debug!("📦️ Released reservation of {count} lines");
    }

    /// Restores every line in reverse order, draining the vector as it goes. A restore
    /// failure is logged loudly and skipped; stopping would strand the remaining lines
    /// just as badly.
    async fn unwind(&self, reserved: &mut Vec<ReservedLine>) {
        while let Some(line) = reserved.pop() {
            if let Err(e) = self.db.restore_stock(&line.product_id, line.quantity).await {
                error!(
                    "📦️ Could not restore {} units of product {} while unwinding a reservation. Stock for this \
                     product is now too low and needs a manual correction. {e}",
                    line.quantity, line.product_id
                );
            }
        }
    }

    /// Read access to the catalog, shared with the cart validator.
    pub async fn product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError> {
        self.db.fetch_product(product_id).await
    }
}
