//! Core book state: slab storage, side-ordered level maps, id index and
//! per-price aggregates.
//!
//! ## Architecture
//!
//! - **Slab**: stores every resting order's node; the slab key is the
//!   position token the id index holds, so cancels never scan a queue
//! - **BTreeMap**: one per side; bids keyed by `Reverse(price)` so both
//!   maps iterate best-first, and last-key access gives the worst price
//! - **HashMap id index**: order id → slab key for O(1) cancel
//! - **AggregateMap**: price → (count, quantity), kept coherent with the
//!   queues on every mutation
//!
//! `BookCore` owns the structure and its coherence; it knows nothing about
//! matching or admission. Callers go through [`Orderbook`], which holds the
//! book lock and runs the matcher.
//!
//! [`Orderbook`]: crate::engine::Orderbook

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use slab::Slab;

use crate::orderbook::aggregate::{AggregateAction, AggregateMap};
#[cfg(test)]
use crate::orderbook::aggregate::LevelData;
use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{Order, OrderId, OrderbookError, Price, Quantity, Side, TradeLeg};

/// One level of a depth snapshot: price plus summed remaining quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub price: Price,
    pub quantity: Quantity,
}

/// The book's data structures, without locking or matching policy.
#[derive(Debug, Default)]
pub struct BookCore {
    /// Node storage; keys double as queue position tokens
    orders: Slab<OrderNode>,

    /// Bid levels, iterated best-first = highest price
    bids: BTreeMap<Reverse<Price>, PriceLevel>,

    /// Ask levels, iterated best-first = lowest price
    asks: BTreeMap<Price, PriceLevel>,

    /// Order id → slab key
    index: HashMap<OrderId, usize>,

    /// Cached per-price (count, quantity)
    aggregates: AggregateMap,
}

impl BookCore {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated order storage
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::with_capacity(order_capacity),
            aggregates: AggregateMap::new(),
        }
    }

    // ========================================================================
    // Size and lookup
    // ========================================================================

    /// Number of resting orders
    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no orders rest in the book
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Check if an order with this id rests in the book
    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a resting order by id
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        let key = *self.index.get(&id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    /// Iterate all resting orders, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().map(|(_, node)| &node.order)
    }

    // ========================================================================
    // Prices and levels
    // ========================================================================

    /// Best (highest) bid price
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Worst (lowest) bid price; anchor for a sell market order
    #[inline]
    pub fn worst_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().map(|r| r.0)
    }

    /// Worst (highest) ask price; anchor for a buy market order
    #[inline]
    pub fn worst_ask(&self) -> Option<Price> {
        self.asks.keys().next_back().copied()
    }

    /// Number of bid price levels
    #[inline]
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels
    #[inline]
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Bid prices, best-first
    pub fn bid_prices(&self) -> impl Iterator<Item = Price> + '_ {
        self.bids.keys().map(|r| r.0)
    }

    /// Ask prices, best-first
    pub fn ask_prices(&self) -> impl Iterator<Item = Price> + '_ {
        self.asks.keys().copied()
    }

    /// Resting orders at one price on one side, queue order (oldest first)
    pub fn orders_at(&self, side: Side, price: Price) -> impl Iterator<Item = &Order> {
        let level = match side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        };
        level
            .into_iter()
            .flat_map(|level| level.keys(&self.orders))
            .map(|key| &self.orders[key].order)
    }

    /// Per-price aggregates
    #[inline]
    pub fn aggregates(&self) -> &AggregateMap {
        &self.aggregates
    }

    /// Depth snapshot: (bid levels, ask levels), best-first on each side
    pub fn snapshot(&self) -> (Vec<LevelSnapshot>, Vec<LevelSnapshot>) {
        let bids = self
            .bid_prices()
            .map(|price| LevelSnapshot {
                price,
                quantity: self.aggregates.quantity_at(price),
            })
            .collect();
        let asks = self
            .ask_prices()
            .map(|price| LevelSnapshot {
                price,
                quantity: self.aggregates.quantity_at(price),
            })
            .collect();
        (bids, asks)
    }

    // ========================================================================
    // Mutation (engine-internal)
    // ========================================================================

    /// Slab key of the oldest order at `price` on `side`, if the level exists
    pub(crate) fn level_head(&self, side: Side, price: Price) -> Option<usize> {
        match side {
            Side::Buy => self.bids.get(&Reverse(price))?.peek_head(),
            Side::Sell => self.asks.get(&price)?.peek_head(),
        }
    }

    /// The order stored under a slab key.
    ///
    /// # Panics
    ///
    /// Panics if `key` is vacant.
    pub(crate) fn order_at(&self, key: usize) -> &Order {
        &self.orders[key].order
    }

    /// Append an order to the tail of its level and index it.
    ///
    /// The caller has already rejected duplicate ids; the order's price is
    /// final (market orders are re-anchored before insertion).
    pub(crate) fn insert(&mut self, order: Order) -> usize {
        debug_assert!(!self.contains(order.id));

        let id = order.id;
        let side = order.side;
        let price = order.price;
        let remaining = order.remaining;

        let key = self.orders.insert(OrderNode::new(order));
        self.index.insert(id, key);

        let level = match side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price)),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price)),
        };
        level.push_back(key, &mut self.orders);

        self.aggregates.apply(price, remaining, AggregateAction::Add);

        key
    }

    /// Cancel a resting order by id.
    ///
    /// Fails with `OrderNotFound` for unknown ids; the book is untouched on
    /// failure.
    pub(crate) fn cancel(&mut self, id: OrderId) -> Result<Order, OrderbookError> {
        let key = *self
            .index
            .get(&id)
            .ok_or(OrderbookError::OrderNotFound(id))?;

        let order = self.detach(key);
        self.aggregates
            .apply(order.price, order.remaining, AggregateAction::Remove);

        Ok(order)
    }

    /// Apply a fill to the resting order under `key` and settle its
    /// bookkeeping: a filled order is detached and its level erased if
    /// emptied; a partial fill only shrinks the aggregates.
    ///
    /// Returns the trade leg stamped with the order's own resting price.
    pub(crate) fn fill_resting(
        &mut self,
        key: usize,
        quantity: Quantity,
    ) -> Result<TradeLeg, OrderbookError> {
        let node = &mut self.orders[key];
        node.order.fill(quantity)?;

        let leg = TradeLeg {
            order_id: node.order.id,
            price: node.order.price,
            quantity,
        };

        if node.order.is_filled() {
            self.detach(key);
            self.aggregates
                .apply(leg.price, quantity, AggregateAction::Remove);
        } else {
            self.aggregates
                .apply(leg.price, quantity, AggregateAction::Match);
        }

        Ok(leg)
    }

    /// Drop the resting order under `key` without touching its remaining
    /// quantity. Used for immediate-or-cancel residue.
    pub(crate) fn discard(&mut self, key: usize) -> Order {
        let order = self.detach(key);
        self.aggregates
            .apply(order.price, order.remaining, AggregateAction::Remove);
        order
    }

    /// Unlink a node from its level queue (erasing the level if emptied),
    /// drop it from the index, and reclaim its slab slot.
    fn detach(&mut self, key: usize) -> Order {
        let node = &self.orders[key];
        let side = node.order.side;
        let price = node.order.price;
        let id = node.order.id;

        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .expect("resting order has no bid level");
                level.remove(key, &mut self.orders);
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&price)
                    .expect("resting order has no ask level");
                level.remove(key, &mut self.orders);
                if level.is_empty() {
                    self.asks.remove(&price);
                }
            }
        }

        self.index.remove(&id);
        self.orders.remove(key).order
    }

    // ========================================================================
    // Structural validation (test support)
    // ========================================================================

    /// Walk the whole structure and assert its coherence: index and level
    /// maps agree, no empty level exists, a price lives on one side only,
    /// the book is not crossed at rest, no filled order rests, and the
    /// aggregates mirror the queues.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut seen = 0usize;

        for (&Reverse(price), level) in &self.bids {
            assert!(!level.is_empty(), "empty bid level at {price}");
            let mut level_quantity: Quantity = 0;
            let mut level_len = 0usize;
            for key in level.keys(&self.orders) {
                let order = &self.orders[key].order;
                assert_eq!(order.side, Side::Buy, "order {} on wrong side", order.id);
                assert_eq!(order.price, price, "order {} on wrong level", order.id);
                assert!(order.remaining > 0, "filled order {} resting", order.id);
                assert_eq!(
                    self.index.get(&order.id),
                    Some(&key),
                    "order {} not indexed at its slab key",
                    order.id
                );
                level_quantity += order.remaining;
                level_len += 1;
                seen += 1;
            }
            assert_eq!(level.len(), level_len, "bid level {price} length drifted");
            let data = self
                .aggregates
                .get(price)
                .unwrap_or_else(|| panic!("no aggregates for bid level {price}"));
            assert_eq!(data.count, level_len as u64, "aggregate count at {price}");
            assert_eq!(data.quantity, level_quantity, "aggregate quantity at {price}");
        }

        for (&price, level) in &self.asks {
            assert!(!level.is_empty(), "empty ask level at {price}");
            assert!(
                !self.bids.contains_key(&Reverse(price)),
                "price {price} present on both sides"
            );
            let mut level_quantity: Quantity = 0;
            let mut level_len = 0usize;
            for key in level.keys(&self.orders) {
                let order = &self.orders[key].order;
                assert_eq!(order.side, Side::Sell, "order {} on wrong side", order.id);
                assert_eq!(order.price, price, "order {} on wrong level", order.id);
                assert!(order.remaining > 0, "filled order {} resting", order.id);
                assert_eq!(
                    self.index.get(&order.id),
                    Some(&key),
                    "order {} not indexed at its slab key",
                    order.id
                );
                level_quantity += order.remaining;
                level_len += 1;
                seen += 1;
            }
            assert_eq!(level.len(), level_len, "ask level {price} length drifted");
            let data = self
                .aggregates
                .get(price)
                .unwrap_or_else(|| panic!("no aggregates for ask level {price}"));
            assert_eq!(data.count, level_len as u64, "aggregate count at {price}");
            assert_eq!(data.quantity, level_quantity, "aggregate quantity at {price}");
        }

        // Every indexed id resolves into the level walk above and vice versa
        assert_eq!(self.index.len(), seen, "index out of step with levels");
        assert_eq!(self.orders.len(), seen, "slab out of step with levels");
        assert_eq!(
            self.aggregates.len(),
            self.bids.len() + self.asks.len(),
            "aggregates track a dead price"
        );

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "book crossed at rest: {bid} >= {ask}");
        }
    }

    /// Aggregates entry for tests that assert on totals directly
    #[cfg(test)]
    pub(crate) fn level_data(&self, price: Price) -> Option<LevelData> {
        self.aggregates.get(price).copied()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
