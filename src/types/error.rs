//! Error types for the matchbook engine.
//!
//! `DuplicateOrderId` and `OrderNotFound` are caller-visible contract
//! violations. `OverFill` and `InvalidPromotion` guard engine internals;
//! they are propagated rather than swallowed, but a correct matcher never
//! produces them. No error leaves the book mutated.

use thiserror::Error;

use crate::types::OrderId;

/// Errors returned by the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderbookError {
    /// An order with this id is already resting in the book
    #[error("Duplicate OrderId detected: {0}")]
    DuplicateOrderId(OrderId),

    /// No resting order with this id
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A fill exceeded the order's remaining quantity
    #[error("Order ({0}) cannot be filled for more than its remaining quantity")]
    OverFill(OrderId),

    /// Price re-anchoring was attempted on a non-market order
    #[error("Order ({0}) cannot have its price adjusted, only market orders can")]
    InvalidPromotion(OrderId),
}
