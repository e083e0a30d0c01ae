//! Instrument lookup module
//!
//! One-shot queries resolving a ticker to tradable instruments

mod client;

pub use client::{Instrument, InstrumentsClient, InstrumentsConfig};
