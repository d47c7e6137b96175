//! The public, thread-safe order book.
//!
//! ## Locking
//!
//! One exclusive [`parking_lot::Mutex`] guards the whole book. Every public
//! operation acquires it once, runs to completion without suspension, and
//! releases it; concurrent callers are linearized in lock order, and FIFO
//! time priority is preserved within that order. Callers that need
//! parallelism across instruments run one `Orderbook` per instrument
//! rather than waiting on finer-grained locking here.

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::engine::matcher;
use crate::orderbook::{BookCore, LevelSnapshot};
use crate::types::{Order, OrderId, OrderbookError, Price, Quantity, Side, Trade};

/// A price-time priority limit order book.
///
/// ## Example
///
/// ```
/// use matchbook::{Order, Orderbook, OrderKind, Side};
///
/// let book = Orderbook::new();
///
/// book.add(Order::new(OrderKind::Limit, 1, Side::Buy, 100, 10)).unwrap();
/// let trades = book.add(Order::new(OrderKind::Limit, 2, Side::Sell, 100, 4)).unwrap();
///
/// assert_eq!(trades.len(), 1);
/// assert_eq!(book.get(1).unwrap().remaining, 6);
/// ```
#[derive(Debug, Default)]
pub struct Orderbook {
    core: Mutex<BookCore>,
}

impl Orderbook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self {
            core: Mutex::new(BookCore::new()),
        }
    }

    /// Create a book with pre-allocated order storage
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            core: Mutex::new(BookCore::with_capacity(order_capacity)),
        }
    }

    /// Submit an order.
    ///
    /// Returns the trades the submission produced; empty when the order
    /// rested without crossing, or when its admission policy dropped it
    /// (market order into an empty contra side, non-crossing
    /// immediate-or-cancel, infeasible all-or-none). Fails with
    /// `DuplicateOrderId` if the id is already resting; a failed add leaves
    /// the book untouched.
    pub fn add(&self, order: Order) -> Result<Vec<Trade>, OrderbookError> {
        let id = order.id;
        let mut core = self.core.lock();
        let trades = matcher::submit(&mut core, order)?;
        debug!(
            order_id = id,
            trades = trades.len(),
            resting = core.len(),
            "order processed"
        );
        Ok(trades)
    }

    /// Cancel a resting order by id.
    ///
    /// Fails with `OrderNotFound` for ids that are not resting (unknown,
    /// already filled, or already cancelled).
    pub fn cancel(&self, id: OrderId) -> Result<(), OrderbookError> {
        let mut core = self.core.lock();
        let order = core.cancel(id)?;
        trace!(order_id = id, remaining = order.remaining, "order cancelled");
        Ok(())
    }

    /// Replace a resting order's side, price and quantity.
    ///
    /// Implemented as cancel-then-resubmit of a fresh order carrying the
    /// original kind, under a single lock acquisition, so the replacement
    /// loses its time priority and may itself cross and trade. The two
    /// phases cannot be interleaved by another caller, but an add that wins
    /// the lock *before* this call still shapes what the resubmission
    /// matches against. Fails with `OrderNotFound` for unknown ids.
    pub fn modify(
        &self,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<Vec<Trade>, OrderbookError> {
        let mut core = self.core.lock();
        let kind = core
            .get(id)
            .map(|order| order.kind)
            .ok_or(OrderbookError::OrderNotFound(id))?;

        core.cancel(id)?;
        let trades = matcher::submit(&mut core, Order::new(kind, id, side, price, quantity))?;
        debug!(order_id = id, trades = trades.len(), "order modified");
        Ok(trades)
    }

    /// Number of resting orders
    pub fn size(&self) -> usize {
        self.core.lock().len()
    }

    /// Check whether an order with this id is resting
    pub fn contains(&self, id: OrderId) -> bool {
        self.core.lock().contains(id)
    }

    /// Copy of a resting order
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.core.lock().get(id).cloned()
    }

    /// Depth snapshot: (bid levels, ask levels), best-first, each level
    /// carrying its price and summed remaining quantity.
    pub fn snapshot(&self) -> (Vec<LevelSnapshot>, Vec<LevelSnapshot>) {
        self.core.lock().snapshot()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
