//! Core types: Price, Quantity, OrderId

use std::fmt;

use serde::{Deserialize, Serialize};

/// Price in smallest units (cents).
///
/// `Price(10050)` represents $100.50. Using fixed-point integers keeps
/// prices usable as ordered map keys and avoids floating-point drift in
/// level bookkeeping. Wire formats carry decimal prices; see
/// [`Price::from_decimal`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Convert a decimal price (e.g. `32.5` from an order feed) into cents.
    pub fn from_decimal(value: f64) -> Self {
        Price((value * 100.0).round() as i64)
    }

    /// The decimal value of this price.
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.0 / 100;
        let cents = (self.0 % 100).abs();
        if self.0 < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), cents)
        } else {
            write!(f, "${}.{:02}", dollars, cents)
        }
    }
}

/// Number of shares. Always positive for live orders.
pub type Quantity = u32;

/// Unique order identifier, assigned by the submitter.
///
/// Unlike exchange-assigned sequence numbers, ids arrive with the order
/// and stay stable across amends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_ordering() {
        assert!(Price(100) < Price(200));
        assert!(Price(-50) < Price(50));
        assert_eq!(Price(100), Price(100));
    }

    #[test]
    fn price_display() {
        assert_eq!(format!("{}", Price(10050)), "$100.50");
        assert_eq!(format!("{}", Price(100)), "$1.00");
        assert_eq!(format!("{}", Price(5)), "$0.05");
        assert_eq!(format!("{}", Price(-250)), "-$2.50");
    }

    #[test]
    fn price_from_decimal() {
        assert_eq!(Price::from_decimal(32.5), Price(3250));
        assert_eq!(Price::from_decimal(100.0), Price(10000));
        assert_eq!(Price::from_decimal(0.01), Price(1));
    }

    #[test]
    fn price_decimal_round_trip() {
        assert_eq!(Price(3250).as_decimal(), 32.5);
    }

    #[test]
    fn order_id_display() {
        assert_eq!(format!("{}", OrderId(42)), "O42");
    }
}
