//! Price level management for orders at the same price.
//!
//! A `PriceLevel` is the FIFO queue of all orders resting at a single price
//! on one side of the book:
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! New orders append at the tail; matching consumes from the head; any
//! order can be unlinked in O(1) via its slab key. The level stores only
//! queue structure; per-price count and quantity totals live in the
//! aggregate map, which covers both sides of the book.

use slab::Slab;

use crate::orderbook::OrderNode;
use crate::types::Price;

/// A FIFO queue of orders at a single price.
///
/// Node data lives in the slab; the level holds only the queue endpoints.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price for this level
    pub price: Price,

    /// Oldest order (matched first), slab key
    head: Option<usize>,

    /// Newest order (appended last), slab key
    tail: Option<usize>,

    /// Number of orders queued at this level
    len: usize,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Check if the price level holds no orders
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of orders queued at this level
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Slab key of the oldest order, the next to match
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Append an order at the tail of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present in the slab.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = slab.get_mut(key).expect("invalid slab key");
        node.prev = self.tail;
        node.next = None;

        if let Some(tail_key) = self.tail {
            let tail_node = slab.get_mut(tail_key).expect("invalid tail key");
            tail_node.next = Some(key);
        } else {
            self.head = Some(key);
        }

        self.tail = Some(key);
        self.len += 1;
    }

    /// Unlink an order from anywhere in the queue.
    ///
    /// The node stays in the slab; only its links are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present in the slab.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = slab.get(key).expect("invalid slab key");
        let prev_key = node.prev;
        let next_key = node.next;

        if let Some(prev) = prev_key {
            let prev_node = slab.get_mut(prev).expect("invalid prev key");
            prev_node.next = next_key;
        } else {
            self.head = next_key;
        }

        if let Some(next) = next_key {
            let next_node = slab.get_mut(next).expect("invalid next key");
            next_node.prev = prev_key;
        } else {
            self.tail = prev_key;
        }

        let node = slab.get_mut(key).expect("invalid slab key");
        node.prev = None;
        node.next = None;

        self.len -= 1;
    }

    /// Iterate slab keys from head (oldest) to tail (newest)
    pub fn keys<'a>(&'a self, slab: &'a Slab<OrderNode>) -> impl Iterator<Item = usize> + 'a {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let key = cursor?;
            cursor = slab.get(key).and_then(|node| node.next);
            Some(key)
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
