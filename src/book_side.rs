//! BookSide: one side of the book, price levels in priority order.
//!
//! A `BTreeMap` keyed by price gives O(log P) level access with ordered
//! iteration. The best price is cached so the matching loop's top-of-book
//! probe is O(1). Empty levels are erased immediately; outside a mutating
//! call the map never holds an empty queue.

use std::collections::BTreeMap;

use crate::level::LevelQueue;
use crate::side::Side;
use crate::types::Price;

/// All price levels of one side.
///
/// - **Bids**: best = highest price, worst = lowest.
/// - **Asks**: best = lowest price, worst = highest.
#[derive(Clone, Debug)]
pub(crate) struct BookSide {
    side: Side,
    levels: BTreeMap<Price, LevelQueue>,
    /// Cached best price.
    best: Option<Price>,
}

impl BookSide {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            best: None,
        }
    }

    #[inline]
    pub(crate) fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub(crate) fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The best price on this side, O(1).
    #[inline]
    pub(crate) fn best_price(&self) -> Option<Price> {
        self.best
    }

    /// The worst price on this side; a market order on the opposite side
    /// is rewritten to this price so every resting level is marketable
    /// against it.
    pub(crate) fn worst_price(&self) -> Option<Price> {
        match self.side {
            Side::Bid => self.levels.keys().next().copied(),
            Side::Ask => self.levels.keys().next_back().copied(),
        }
    }

    pub(crate) fn get(&self, price: Price) -> Option<&LevelQueue> {
        self.levels.get(&price)
    }

    pub(crate) fn get_mut(&mut self, price: Price) -> Option<&mut LevelQueue> {
        self.levels.get_mut(&price)
    }

    /// The level at `price`, created if absent. Keeps the best-price
    /// cache current.
    pub(crate) fn get_or_create(&mut self, price: Price) -> &mut LevelQueue {
        if !self.levels.contains_key(&price) {
            self.note_inserted(price);
            self.levels.insert(price, LevelQueue::new(price));
        }
        self.levels
            .get_mut(&price)
            .expect("level exists after insertion")
    }

    /// Erase the level at `price`, recomputing the cached best if it was
    /// the one removed.
    pub(crate) fn remove_level(&mut self, price: Price) {
        if self.levels.remove(&price).is_some() && self.best == Some(price) {
            self.recompute_best();
        }
    }

    /// Levels from best to worst: descending for bids, ascending for asks.
    pub(crate) fn iter_best_to_worst(&self) -> BestToWorst<'_> {
        BestToWorst {
            inner: match self.side {
                Side::Bid => Levels::Reverse(self.levels.iter().rev()),
                Side::Ask => Levels::Forward(self.levels.iter()),
            },
        }
    }

    fn recompute_best(&mut self) {
        self.best = match self.side {
            Side::Bid => self.levels.keys().next_back().copied(),
            Side::Ask => self.levels.keys().next().copied(),
        };
    }

    fn note_inserted(&mut self, price: Price) {
        let better = match (self.side, self.best) {
            (_, None) => true,
            (Side::Bid, Some(best)) => price > best,
            (Side::Ask, Some(best)) => price < best,
        };
        if better {
            self.best = Some(price);
        }
    }
}

type LevelsIter<'a> = std::collections::btree_map::Iter<'a, Price, LevelQueue>;

enum Levels<'a> {
    Forward(LevelsIter<'a>),
    Reverse(std::iter::Rev<LevelsIter<'a>>),
}

/// Iterator over one side's levels in priority order.
pub(crate) struct BestToWorst<'a> {
    inner: Levels<'a>,
}

impl<'a> Iterator for BestToWorst<'a> {
    type Item = (&'a Price, &'a LevelQueue);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Levels::Forward(iter) => iter.next(),
            Levels::Reverse(iter) => iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_with_levels(side: Side, prices: &[i64]) -> BookSide {
        let mut book_side = BookSide::new(side);
        for &price in prices {
            book_side.get_or_create(Price(price));
        }
        book_side
    }

    #[test]
    fn new_side_is_empty() {
        let bids = BookSide::new(Side::Bid);
        assert!(bids.is_empty());
        assert_eq!(bids.level_count(), 0);
        assert_eq!(bids.best_price(), None);
        assert_eq!(bids.worst_price(), None);
    }

    #[test]
    fn bid_best_is_highest() {
        let mut bids = BookSide::new(Side::Bid);

        bids.get_or_create(Price(100_00));
        assert_eq!(bids.best_price(), Some(Price(100_00)));

        bids.get_or_create(Price(99_00));
        assert_eq!(bids.best_price(), Some(Price(100_00)));

        bids.get_or_create(Price(101_00));
        assert_eq!(bids.best_price(), Some(Price(101_00)));
    }

    #[test]
    fn ask_best_is_lowest() {
        let mut asks = BookSide::new(Side::Ask);

        asks.get_or_create(Price(100_00));
        asks.get_or_create(Price(101_00));
        assert_eq!(asks.best_price(), Some(Price(100_00)));

        asks.get_or_create(Price(99_00));
        assert_eq!(asks.best_price(), Some(Price(99_00)));
    }

    #[test]
    fn worst_is_the_opposite_extreme() {
        let bids = side_with_levels(Side::Bid, &[99_00, 101_00, 100_00]);
        assert_eq!(bids.best_price(), Some(Price(101_00)));
        assert_eq!(bids.worst_price(), Some(Price(99_00)));

        let asks = side_with_levels(Side::Ask, &[42_00, 41_00, 43_00]);
        assert_eq!(asks.best_price(), Some(Price(41_00)));
        assert_eq!(asks.worst_price(), Some(Price(43_00)));
    }

    #[test]
    fn remove_best_level_updates_cache() {
        let mut bids = side_with_levels(Side::Bid, &[99_00, 100_00, 101_00]);

        bids.remove_level(Price(101_00));
        assert_eq!(bids.best_price(), Some(Price(100_00)));

        bids.remove_level(Price(100_00));
        assert_eq!(bids.best_price(), Some(Price(99_00)));

        bids.remove_level(Price(99_00));
        assert_eq!(bids.best_price(), None);
    }

    #[test]
    fn remove_non_best_level_keeps_cache() {
        let mut asks = side_with_levels(Side::Ask, &[100_00, 101_00]);

        asks.remove_level(Price(101_00));
        assert_eq!(asks.best_price(), Some(Price(100_00)));
    }

    #[test]
    fn iter_bids_descending() {
        let bids = side_with_levels(Side::Bid, &[99_00, 101_00, 100_00]);
        let prices: Vec<i64> = bids.iter_best_to_worst().map(|(p, _)| p.0).collect();
        assert_eq!(prices, vec![101_00, 100_00, 99_00]);
    }

    #[test]
    fn iter_asks_ascending() {
        let asks = side_with_levels(Side::Ask, &[99_00, 101_00, 100_00]);
        let prices: Vec<i64> = asks.iter_best_to_worst().map(|(p, _)| p.0).collect();
        assert_eq!(prices, vec![99_00, 100_00, 101_00]);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut bids = BookSide::new(Side::Bid);
        bids.get_or_create(Price(100_00));
        bids.get_or_create(Price(100_00));
        assert_eq!(bids.level_count(), 1);
        assert_eq!(bids.side(), Side::Bid);
    }
}
