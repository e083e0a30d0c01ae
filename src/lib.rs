//! tinvest-bot: Order book streaming bot for the T-Invest market data API
//!
//! This library provides the core components for:
//! - Environment-based configuration with sandbox/production selection
//! - A duplex streaming session: subscribe handshake, keep-alive producer,
//!   inbound dispatch, cooperative shutdown
//! - Order book domain types with units/nano price handling
//! - One-shot instrument lookup by ticker
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod instruments;
pub mod orderbook;
pub mod stream;
pub mod telemetry;
