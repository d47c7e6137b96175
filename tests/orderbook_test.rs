//! Behavioral tests for the public order book surface.
//!
//! Each scenario drives the book through `add`/`cancel`/`modify` and then
//! checks the externally observable state: emitted trades, resting orders
//! (via `get`), and depth (via `snapshot`).

use matchbook::{Order, OrderId, OrderKind, Orderbook, OrderbookError, Price, Quantity, Side};

fn limit(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Order {
    Order::new(OrderKind::Limit, id, side, price, quantity)
}

fn partially_filled(
    kind: OrderKind,
    id: OrderId,
    side: Side,
    price: Price,
    quantity: Quantity,
    remaining: Quantity,
) -> Order {
    let mut order = Order::new(kind, id, side, price, quantity);
    order.remaining = remaining;
    order
}

/// Assert the book holds exactly `expected` (structural equality per order).
fn assert_book_holds(book: &Orderbook, expected: &[Order]) {
    assert_eq!(book.size(), expected.len(), "unexpected resting order count");
    for order in expected {
        let resting = book
            .get(order.id)
            .unwrap_or_else(|| panic!("book is missing expected order {}", order.id));
        assert_eq!(&resting, order, "order {} has drifted", order.id);
    }
}

/// Depth totals must agree with the orders resting at each level.
fn assert_depth_consistent(book: &Orderbook, expected: &[Order]) {
    let (bids, asks) = book.snapshot();

    for (side, levels) in [(Side::Buy, &bids), (Side::Sell, &asks)] {
        for level in levels {
            let total: Quantity = expected
                .iter()
                .filter(|o| o.side == side && o.price == level.price)
                .map(|o| o.remaining)
                .sum();
            assert_eq!(
                level.quantity, total,
                "depth at {} out of step with resting orders",
                level.price
            );
        }
    }

    // Best bid strictly below best ask whenever both sides are populated
    if let (Some(bid), Some(ask)) = (bids.first(), asks.first()) {
        assert!(bid.price < ask.price, "book rests crossed");
    }
}

fn assert_book_state(book: &Orderbook, expected: &[Order]) {
    assert_book_holds(book, expected);
    assert_depth_consistent(book, expected);
}

// ============================================================================
// Add / cancel / modify
// ============================================================================

#[test]
fn add_rests_non_crossing_orders() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();
    book.add(limit(2, Side::Sell, 100, 6)).unwrap();
    book.add(limit(3, Side::Sell, 99, 8)).unwrap();

    assert_book_state(
        &book,
        &[
            limit(1, Side::Sell, 100, 10),
            limit(2, Side::Sell, 100, 6),
            limit(3, Side::Sell, 99, 8),
        ],
    );
}

#[test]
fn add_duplicate_order_id_fails() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();

    let err = book.add(limit(1, Side::Buy, 98, 20)).unwrap_err();
    assert_eq!(err, OrderbookError::DuplicateOrderId(1));

    assert_book_state(&book, &[limit(1, Side::Sell, 100, 10)]);
}

#[test]
fn cancel_removes_order() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();
    book.add(limit(2, Side::Sell, 100, 6)).unwrap();
    book.add(limit(3, Side::Sell, 99, 8)).unwrap();

    book.cancel(1).unwrap();

    assert_book_state(
        &book,
        &[limit(2, Side::Sell, 100, 6), limit(3, Side::Sell, 99, 8)],
    );
}

#[test]
fn cancel_non_existing_order_fails() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();

    assert_eq!(book.cancel(5), Err(OrderbookError::OrderNotFound(5)));
    assert_book_state(&book, &[limit(1, Side::Sell, 100, 10)]);
}

#[test]
fn add_then_cancel_is_a_noop() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Sell, 105, 3)).unwrap();
    let before = book.snapshot();

    book.add(limit(3, Side::Buy, 99, 25)).unwrap();
    book.cancel(3).unwrap();

    assert_eq!(book.snapshot(), before);
    assert_eq!(book.size(), 2);
    assert!(!book.contains(3));
}

#[test]
fn modify_rewrites_order() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 100, 6)).unwrap();
    book.add(limit(3, Side::Buy, 99, 8)).unwrap();

    book.modify(2, Side::Sell, 101, 7).unwrap();

    assert_book_state(
        &book,
        &[
            limit(1, Side::Buy, 100, 10),
            limit(2, Side::Sell, 101, 7),
            limit(3, Side::Buy, 99, 8),
        ],
    );
}

#[test]
fn modify_non_existing_order_fails() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();

    let err = book.modify(4, Side::Sell, 101, 7).unwrap_err();
    assert_eq!(err, OrderbookError::OrderNotFound(4));

    assert_book_state(&book, &[limit(1, Side::Buy, 100, 10)]);
}

#[test]
fn modify_in_place_trails_same_price_peers() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 100, 10)).unwrap();

    book.modify(1, Side::Buy, 100, 10).unwrap();

    let trades = book.add(limit(3, Side::Sell, 100, 10)).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, 2);

    assert_book_state(&book, &[limit(1, Side::Buy, 100, 10)]);
}

// ============================================================================
// Limit matching
// ============================================================================

#[test]
fn limit_aggressor_constrained() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 101, 50)).unwrap();

    let trades = book.add(limit(3, Side::Sell, 100, 20)).unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity(), 20);
    assert_eq!(trades[0].bid.order_id, 2);
    assert_eq!(trades[0].bid.price, 101);
    assert_eq!(trades[0].ask.order_id, 3);

    assert_book_state(
        &book,
        &[
            limit(1, Side::Buy, 100, 10),
            partially_filled(OrderKind::Limit, 2, Side::Buy, 101, 50, 30),
        ],
    );
}

#[test]
fn limit_taker_constrained() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 101, 20)).unwrap();

    let trades = book.add(limit(3, Side::Sell, 100, 50)).unwrap();

    let traded: Quantity = trades.iter().map(|t| t.quantity()).sum();
    assert_eq!(traded, 30);

    assert_book_state(
        &book,
        &[partially_filled(OrderKind::Limit, 3, Side::Sell, 100, 50, 20)],
    );
}

#[test]
fn limit_sweeps_successive_aggressors() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 101, 50)).unwrap();
    book.add(limit(3, Side::Sell, 100, 20)).unwrap();
    book.add(limit(4, Side::Sell, 99, 31)).unwrap();
    book.add(limit(5, Side::Sell, 98, 5)).unwrap();

    assert_book_state(
        &book,
        &[partially_filled(OrderKind::Limit, 1, Side::Buy, 100, 10, 4)],
    );
}

#[test]
fn limit_non_crossing_rests_everything() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(3, Side::Sell, 102, 20)).unwrap();
    book.add(limit(2, Side::Buy, 101, 50)).unwrap();
    book.add(limit(4, Side::Sell, 103, 31)).unwrap();

    assert_book_state(
        &book,
        &[
            limit(1, Side::Buy, 100, 10),
            limit(3, Side::Sell, 102, 20),
            limit(2, Side::Buy, 101, 50),
            limit(4, Side::Sell, 103, 31),
        ],
    );
}

// ============================================================================
// ImmediateOrCancel
// ============================================================================

#[test]
fn ioc_taker_constrained_drops_residue() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 99, 10)).unwrap();
    book.add(limit(2, Side::Buy, 101, 10)).unwrap();
    book.add(limit(3, Side::Buy, 103, 10)).unwrap();
    book.add(limit(4, Side::Buy, 102, 10)).unwrap();
    book.add(limit(5, Side::Buy, 98, 10)).unwrap();

    let ioc = Order::new(OrderKind::ImmediateOrCancel, 6, Side::Sell, 100, 50);
    let trades = book.add(ioc).unwrap();

    assert_eq!(trades.len(), 3);
    assert_eq!(
        trades.iter().map(|t| (t.bid.order_id, t.bid.price)).collect::<Vec<_>>(),
        vec![(3, 103), (4, 102), (2, 101)]
    );
    assert!(trades.iter().all(|t| t.quantity() == 10));

    assert_book_state(
        &book,
        &[limit(1, Side::Buy, 99, 10), limit(5, Side::Buy, 98, 10)],
    );
}

#[test]
fn ioc_non_crossing_is_dropped() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 10)).unwrap();
    book.add(limit(2, Side::Buy, 100, 10)).unwrap();

    let ioc = Order::new(OrderKind::ImmediateOrCancel, 3, Side::Sell, 101, 25);
    let trades = book.add(ioc).unwrap();

    assert!(trades.is_empty());
    assert_book_state(
        &book,
        &[limit(1, Side::Buy, 100, 10), limit(2, Side::Buy, 100, 10)],
    );
}

// ============================================================================
// AllOrNone
// ============================================================================

#[test]
fn aon_covered_fills_completely() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 101, 10)).unwrap();
    book.add(limit(2, Side::Buy, 102, 10)).unwrap();
    book.add(limit(3, Side::Buy, 102, 50)).unwrap();

    let aon = Order::new(OrderKind::AllOrNone, 4, Side::Sell, 100, 25);
    let trades = book.add(aon).unwrap();

    let traded: Quantity = trades.iter().map(|t| t.quantity()).sum();
    assert_eq!(traded, 25);

    assert_book_state(
        &book,
        &[
            limit(1, Side::Buy, 101, 10),
            partially_filled(OrderKind::Limit, 3, Side::Buy, 102, 50, 35),
        ],
    );
}

#[test]
fn aon_short_by_one_is_dropped() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();
    book.add(limit(2, Side::Sell, 100, 14)).unwrap();

    let aon = Order::new(OrderKind::AllOrNone, 3, Side::Buy, 100, 25);
    let trades = book.add(aon).unwrap();

    assert!(trades.is_empty());
    assert_book_state(
        &book,
        &[limit(1, Side::Sell, 100, 10), limit(2, Side::Sell, 100, 14)],
    );
}

#[test]
fn aon_exactly_covered_fills() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();
    book.add(limit(2, Side::Sell, 100, 15)).unwrap();

    let aon = Order::new(OrderKind::AllOrNone, 3, Side::Buy, 100, 25);
    let trades = book.add(aon).unwrap();

    let traded: Quantity = trades.iter().map(|t| t.quantity()).sum();
    assert_eq!(traded, 25);
    assert_eq!(book.size(), 0);
}

#[test]
fn aon_miss_leaves_book_unchanged() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Sell, 100, 10)).unwrap();

    let aon = Order::new(OrderKind::AllOrNone, 42, Side::Buy, 100, 25);
    let trades = book.add(aon).unwrap();

    assert!(trades.is_empty());
    assert!(!book.contains(42));
    assert_book_state(&book, &[limit(1, Side::Sell, 100, 10)]);
}

// ============================================================================
// Market
// ============================================================================

#[test]
fn market_taker_constrained() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 100, 50)).unwrap();
    book.add(limit(2, Side::Buy, 101, 10)).unwrap();

    let trades = book.add(Order::market(3, Side::Sell, 20)).unwrap();

    let traded: Quantity = trades.iter().map(|t| t.quantity()).sum();
    assert_eq!(traded, 20);

    assert_book_state(
        &book,
        &[partially_filled(OrderKind::Limit, 1, Side::Buy, 100, 50, 40)],
    );
}

#[test]
fn market_aggressor_constrained_rests_at_anchor() {
    let book = Orderbook::new();

    book.add(limit(1, Side::Buy, 101, 10)).unwrap();
    book.add(limit(2, Side::Buy, 100, 5)).unwrap();

    let trades = book.add(Order::market(3, Side::Sell, 50)).unwrap();

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].bid.price, 101);
    assert_eq!(trades[1].bid.price, 100);

    // Residue converts to a resting limit at the worst-bid anchor
    assert_book_state(
        &book,
        &[partially_filled(OrderKind::Limit, 3, Side::Sell, 100, 50, 35)],
    );
}

#[test]
fn market_into_empty_book_is_dropped() {
    let book = Orderbook::new();

    let trades = book.add(Order::market(1, Side::Sell, 50)).unwrap();

    assert!(trades.is_empty());
    assert_eq!(book.size(), 0);
    let (bids, asks) = book.snapshot();
    assert!(bids.is_empty());
    assert!(asks.is_empty());
}
