//! Order book update state

use super::OrderLevel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One order book snapshot for an instrument, as delivered by the stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookUpdate {
    /// Instrument identifier (FIGI)
    pub figi: String,
    /// Requested book depth
    pub depth: u32,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<OrderLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<OrderLevel>,
    /// Exchange timestamp of the snapshot
    pub time: DateTime<Utc>,
}

impl OrderBookUpdate {
    /// Create a new empty update
    pub fn new(figi: impl Into<String>) -> Self {
        Self {
            figi: figi.into(),
            depth: 0,
            bids: vec![],
            asks: vec![],
            time: Utc::now(),
        }
    }

    /// Get the best bid level
    pub fn best_bid(&self) -> Option<&OrderLevel> {
        self.bids.first()
    }

    /// Get the best ask level
    pub fn best_ask(&self) -> Option<&OrderLevel> {
        self.asks.first()
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                Some((bid.price.to_decimal() + ask.price.to_decimal()) / Decimal::TWO)
            }
            _ => None,
        }
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price.to_decimal() - bid.price.to_decimal()),
            _ => None,
        }
    }

    /// True when both sides of the book carry at least one level
    pub fn has_both_sides(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }
}
