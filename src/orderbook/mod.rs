//! Order book module
//!
//! Domain types for order book updates received from the market data stream

mod book;
mod quotation;

pub use book::OrderBookUpdate;
pub use quotation::Quotation;

use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLevel {
    /// Price at this level
    pub price: Quotation,
    /// Number of lots available
    pub quantity: i64,
}
