//! Trade type representing an executed match between two orders.

use crate::types::{OrderId, Price, Quantity};

/// One side of a trade.
///
/// Carries the resting order's id, the price that order was posted at when
/// it matched, and the executed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeLeg {
    /// Id of the order on this leg
    pub order_id: OrderId,

    /// The leg's own resting price at match time
    pub price: Price,

    /// Executed quantity (identical on both legs)
    pub quantity: Quantity,
}

/// A trade between a resting bid and a resting ask.
///
/// Both legs carry the same quantity but each its own posted price. The two
/// prices differ only when the aggressor crossed through a better-priced
/// contra level; price improvement accrues to the side that was already
/// resting.
///
/// ## Example
///
/// ```
/// use matchbook::{Trade, TradeLeg};
///
/// let trade = Trade::new(
///     TradeLeg { order_id: 2, price: 101, quantity: 20 },
///     TradeLeg { order_id: 3, price: 100, quantity: 20 },
/// );
/// assert_eq!(trade.quantity(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    /// The buy-side leg
    pub bid: TradeLeg,

    /// The sell-side leg
    pub ask: TradeLeg,
}

impl Trade {
    /// Create a new trade from its two legs
    pub fn new(bid: TradeLeg, ask: TradeLeg) -> Self {
        Self { bid, ask }
    }

    /// Executed quantity, identical on both legs
    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
