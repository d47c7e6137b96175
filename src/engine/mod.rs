//! Matching engine module.
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - Within a price level, earlier-inserted orders match first (FIFO)
//! - Partial fills rest on the book; special kinds override this
//!   (see [`OrderKind`](crate::types::OrderKind))
//!
//! The admission and matching internals live in [`matcher`]; hosts only
//! ever touch [`Orderbook`].

pub(crate) mod matcher;

pub mod book;

pub use book::Orderbook;
