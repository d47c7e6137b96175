//! # matchbook
//!
//! In-memory limit-order matching engine with strict price-time priority.
//!
//! ## Architecture
//!
//! - **Types**: core values (`Order`, `Trade`, errors)
//! - **OrderBook**: slab-backed book structures with an O(1)-cancel index
//!   and cached per-price aggregates
//! - **Engine**: admission policy, the matching loop, and the thread-safe
//!   [`Orderbook`] hosts interact with
//!
//! ## Design Principles
//!
//! 1. **Price-time priority**: better prices match first, FIFO within a
//!    price
//! 2. **Coherence at every boundary**: index, level queues and aggregates
//!    agree after every public operation; a failed operation changes
//!    nothing
//! 3. **One lock per book**: operations are linearized by a single
//!    exclusive lock; scale across instruments with one book each
//! 4. **No surprises in the hot path**: no I/O, no timers, no allocation
//!    beyond the order structures themselves
//!
//! ## Example
//!
//! ```
//! use matchbook::{Order, Orderbook, OrderKind, Side};
//!
//! let book = Orderbook::new();
//!
//! book.add(Order::new(OrderKind::Limit, 1, Side::Buy, 100, 10)).unwrap();
//! book.add(Order::new(OrderKind::Limit, 2, Side::Buy, 101, 50)).unwrap();
//! let trades = book.add(Order::new(OrderKind::Limit, 3, Side::Sell, 100, 20)).unwrap();
//!
//! // The higher bid matched first, at its own resting price
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].bid.order_id, 2);
//! assert_eq!(trades[0].bid.price, 101);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core value types: Order, Trade, errors
pub mod types;

/// Book data structures: nodes, levels, aggregates, the assembled core
pub mod orderbook;

/// Admission, matching, and the public thread-safe book
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::Orderbook;
pub use orderbook::LevelSnapshot;
pub use types::{Order, OrderId, OrderKind, OrderbookError, Price, Quantity, Side, Trade, TradeLeg};
