//! Book snapshots for introspection and tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::book_side::BookSide;
use crate::types::Price;

/// A point-in-time view of the book's levels, best first on both sides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Bid levels, highest price first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, lowest price first.
    pub asks: Vec<LevelSnapshot>,
}

/// One price level's summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// Price of the level.
    pub price: Price,
    /// Sum of remaining shares at the level.
    pub total_shares: u64,
    /// Number of resting orders at the level.
    pub total_orders: u32,
}

impl BookSnapshot {
    /// The best bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    /// The best ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Best ask minus best bid, in cents, when both sides are populated.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.0 - bid.0),
            _ => None,
        }
    }
}

impl fmt::Display for BookSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order Book:")?;
        writeln!(f, "Bids:")?;
        for level in &self.bids {
            writeln!(
                f,
                "  Price = {}, Orders = {}, Shares = {}",
                level.price, level.total_orders, level.total_shares
            )?;
        }
        writeln!(f, "Asks:")?;
        for level in &self.asks {
            writeln!(
                f,
                "  Price = {}, Orders = {}, Shares = {}",
                level.price, level.total_orders, level.total_shares
            )?;
        }
        Ok(())
    }
}

impl Book {
    /// Snapshot the top `depth` levels of each side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let collect = |side: &BookSide| -> Vec<LevelSnapshot> {
            side.iter_best_to_worst()
                .take(depth)
                .map(|(&price, queue)| {
                    let aggregate = self.aggregates.get(price).unwrap_or_default();
                    debug_assert_eq!(u32::try_from(queue.len()).ok(), Some(aggregate.total_orders));
                    LevelSnapshot {
                        price,
                        total_shares: aggregate.total_shares,
                        total_orders: aggregate.total_orders,
                    }
                })
                .collect()
        };

        BookSnapshot {
            bids: collect(&self.bids),
            asks: collect(&self.asks),
        }
    }

    /// Snapshot every level of both sides.
    pub fn full_snapshot(&self) -> BookSnapshot {
        self.snapshot(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::OrderKind;
    use crate::order::Order;
    use crate::side::Side;
    use crate::types::OrderId;

    fn populated_book() -> Book {
        let mut book = Book::new();
        for (id, side, price, shares) in [
            (1, Side::Bid, 100_00, 100),
            (2, Side::Bid, 100_00, 50),
            (3, Side::Bid, 99_00, 200),
            (4, Side::Ask, 101_00, 75),
            (5, Side::Ask, 102_00, 150),
        ] {
            book.add(Order::limit(OrderId(id), OrderKind::Gtc, side, Price(price), shares).unwrap());
        }
        book
    }

    #[test]
    fn empty_snapshot() {
        let book = Book::new();
        let snap = book.full_snapshot();

        assert!(snap.bids.is_empty());
        assert!(snap.asks.is_empty());
        assert_eq!(snap.best_bid(), None);
        assert_eq!(snap.best_ask(), None);
        assert_eq!(snap.spread(), None);
    }

    #[test]
    fn levels_in_priority_order() {
        let book = populated_book();
        let snap = book.full_snapshot();

        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.bids[0].price, Price(100_00));
        assert_eq!(snap.bids[0].total_shares, 150);
        assert_eq!(snap.bids[0].total_orders, 2);
        assert_eq!(snap.bids[1].price, Price(99_00));

        assert_eq!(snap.asks.len(), 2);
        assert_eq!(snap.asks[0].price, Price(101_00));
        assert_eq!(snap.asks[1].price, Price(102_00));

        assert_eq!(snap.spread(), Some(100));
    }

    #[test]
    fn depth_limits_both_sides() {
        let book = populated_book();
        let snap = book.snapshot(1);

        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.asks.len(), 1);
    }

    #[test]
    fn display_lists_both_sides() {
        let book = populated_book();
        let text = book.full_snapshot().to_string();

        assert!(text.contains("Bids:"));
        assert!(text.contains("Asks:"));
        assert!(text.contains("Price = $100.00, Orders = 2, Shares = 150"));
    }
}
