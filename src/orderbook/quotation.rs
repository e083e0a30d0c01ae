//! Decimal price representation used on the wire
//!
//! Prices arrive as an integer whole-units part plus a fractional part in
//! nanos (1e-9). Both parts carry the sign of the value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of nano units in one whole unit
pub const NANO_FACTOR: i32 = 1_000_000_000;

/// A decimal value split into whole units and a nano (1e-9) fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quotation {
    /// Whole units part
    pub units: i64,
    /// Fractional part in nanos, same sign as `units`
    pub nano: i32,
}

impl Quotation {
    /// Create a quotation from its parts
    pub fn new(units: i64, nano: i32) -> Self {
        Self { units, nano }
    }

    /// Convert to a `Decimal` for arithmetic
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(self.nano as i64, 9)
    }

    /// True when both parts are zero
    pub fn is_zero(self) -> bool {
        self.units == 0 && self.nano == 0
    }
}

impl fmt::Display for Quotation {
    /// Renders as `units.fraction` with trailing zeros stripped; a whole
    /// value renders without a decimal point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 || self.nano < 0 { "-" } else { "" };
        let units = self.units.unsigned_abs();
        let nano = self.nano.unsigned_abs();

        if nano == 0 {
            return write!(f, "{sign}{units}");
        }

        let mut fraction = format!("{nano:09}");
        while fraction.ends_with('0') {
            fraction.pop();
        }
        write!(f, "{sign}{units}.{fraction}")
    }
}
