//! Order admission and matching.
//!
//! ## Admission
//!
//! Every incoming order passes the kind-specific checks before it touches
//! the book, in this order:
//!
//! 1. duplicate id → error
//! 2. Market: re-anchor to the worst contra price and promote to Limit;
//!    with no contra side the order is dropped without error
//! 3. ImmediateOrCancel: dropped unless some contra level crosses its price
//! 4. AllOrNone: dropped unless the contra quantity resting at-or-better
//!    than its price covers it completely
//!
//! An admitted order always rests first: even an aggressor that will fill
//! immediately is appended to its own side, then the match loop runs. A
//! market order inserted at the *worst* contra price therefore traverses
//! the entire opposite side, which is exactly market semantics inside a
//! pure limit book.
//!
//! ## Matching
//!
//! Strict price-time priority: while the best bid and best ask cross, the
//! two level heads trade `min` of their remainings. Each emitted leg is
//! stamped with that resting order's own posted price, so price
//! improvement accrues to the order that was resting first. After the
//! loop, an ImmediateOrCancel at a best-level head can only be the residue
//! of this call's aggressor; it is cancelled rather than left to rest.

use crate::orderbook::BookCore;
use crate::types::{Order, OrderKind, OrderbookError, Price, Quantity, Side, Trade};

/// Admit `order` and run the match loop.
///
/// Returns the trades emitted by this submission; an empty list means the
/// order rested without crossing or was dropped by its admission policy.
pub(crate) fn submit(book: &mut BookCore, mut order: Order) -> Result<Vec<Trade>, OrderbookError> {
    if book.contains(order.id) {
        return Err(OrderbookError::DuplicateOrderId(order.id));
    }

    if order.kind == OrderKind::Market {
        let anchor = match order.side {
            Side::Buy => book.worst_ask(),
            Side::Sell => book.worst_bid(),
        };
        match anchor {
            Some(price) => order.promote_to_limit(price)?,
            None => return Ok(Vec::new()),
        }
    }

    if order.kind == OrderKind::ImmediateOrCancel && !can_match(book, order.side, order.price) {
        return Ok(Vec::new());
    }

    if order.kind == OrderKind::AllOrNone
        && !can_fill_completely(book, order.side, order.price, order.remaining)
    {
        return Ok(Vec::new());
    }

    book.insert(order);
    match_book(book)
}

/// Check whether any contra level satisfies `price`.
fn can_match(book: &BookCore, side: Side, price: Price) -> bool {
    match side {
        Side::Buy => book.best_ask().is_some_and(|ask| price >= ask),
        Side::Sell => book.best_bid().is_some_and(|bid| price <= bid),
    }
}

/// Check whether contra quantity resting at-or-better than `price` covers
/// `quantity` completely. One walk over contra levels, reading the cached
/// aggregates instead of individual orders.
fn can_fill_completely(book: &BookCore, side: Side, price: Price, quantity: Quantity) -> bool {
    if !can_match(book, side, price) {
        return false;
    }

    let mut available: Quantity = 0;
    match side {
        Side::Buy => {
            for level_price in book.ask_prices() {
                if level_price > price {
                    break;
                }
                available += book.aggregates().quantity_at(level_price);
                if available >= quantity {
                    return true;
                }
            }
        }
        Side::Sell => {
            for level_price in book.bid_prices() {
                if level_price < price {
                    break;
                }
                available += book.aggregates().quantity_at(level_price);
                if available >= quantity {
                    return true;
                }
            }
        }
    }

    false
}

/// Cross the spread until the book is uncrossed, then clear any
/// immediate-or-cancel residue from the best-level heads.
fn match_book(book: &mut BookCore) -> Result<Vec<Trade>, OrderbookError> {
    let mut trades = Vec::new();

    loop {
        let (bid_price, ask_price) = match (book.best_bid(), book.best_ask()) {
            (Some(bid), Some(ask)) => (bid, ask),
            _ => break,
        };
        if bid_price < ask_price {
            break;
        }

        // Head-to-head until one of the two crossing levels empties; a
        // fully filled head is detached (and its level erased) by the fill.
        while let (Some(bid_key), Some(ask_key)) = (
            book.level_head(Side::Buy, bid_price),
            book.level_head(Side::Sell, ask_price),
        ) {
            let quantity = book
                .order_at(bid_key)
                .remaining
                .min(book.order_at(ask_key).remaining);

            let bid_leg = book.fill_resting(bid_key, quantity)?;
            let ask_leg = book.fill_resting(ask_key, quantity)?;
            trades.push(Trade::new(bid_leg, ask_leg));
        }
    }

    cancel_ioc_residue(book);

    Ok(trades)
}

/// An ImmediateOrCancel at a best-level head after matching must be the
/// aggressor that was inserted by this very call (admission guarantees no
/// earlier one could have rested); drop it.
fn cancel_ioc_residue(book: &mut BookCore) {
    for side in [Side::Buy, Side::Sell] {
        let best = match side {
            Side::Buy => book.best_bid(),
            Side::Sell => book.best_ask(),
        };
        let Some(key) = best.and_then(|price| book.level_head(side, price)) else {
            continue;
        };
        if book.order_at(key).kind == OrderKind::ImmediateOrCancel {
            book.discard(key);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
