//! LevelAggregates: per-price (total shares, total orders) summaries.
//!
//! This is the single choke point for aggregate maintenance; every path
//! that touches a level goes through [`LevelAggregates::update`]. The map
//! is keyed by price alone: because the book is never crossed at rest,
//! the two sides occupy disjoint price ranges, and a transiently shared
//! price during matching nets out by the time the crossing loop exits.

use rustc_hash::FxHashMap;

use crate::types::{Price, Quantity};

/// How a level is being touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// A new order joined the level.
    Add,
    /// An order left the level (cancel, prune, or full fill).
    Remove,
    /// An order at the level was partially filled; it still rests.
    Match,
}

/// What the update did to the level, consumed by the latency meter to
/// pick a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LevelChange {
    /// The price had no level before; one was created.
    NewLevel,
    /// The level existed and still does.
    Updated,
    /// The last order left and the entry was erased.
    LastRemoved,
}

/// Aggregate data for one price level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LevelData {
    /// Sum of remaining shares across the level's orders.
    pub(crate) total_shares: u64,
    /// Number of orders resting at the level.
    pub(crate) total_orders: u32,
}

/// Per-price summaries for both sides of the book.
#[derive(Clone, Debug, Default)]
pub(crate) struct LevelAggregates {
    data: FxHashMap<Price, LevelData>,
}

impl LevelAggregates {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn get(&self, price: Price) -> Option<LevelData> {
        self.data.get(&price).copied()
    }

    /// Apply `action` for `shares` at `price`.
    ///
    /// A `Match` or `Remove` against an unknown price is a logic error
    /// elsewhere in the engine; it is reported and the map is left
    /// untouched.
    pub(crate) fn update(&mut self, price: Price, shares: Quantity, action: Action) -> LevelChange {
        if !self.data.contains_key(&price) {
            if action == Action::Add {
                self.data.insert(
                    price,
                    LevelData {
                        total_shares: u64::from(shares),
                        total_orders: 1,
                    },
                );
                return LevelChange::NewLevel;
            }
            tracing::warn!(%price, ?action, "update against a missing price level");
            return LevelChange::Updated;
        }

        let level = self
            .data
            .get_mut(&price)
            .expect("level exists after the membership check");
        match action {
            Action::Add => {
                level.total_shares += u64::from(shares);
                level.total_orders += 1;
                LevelChange::Updated
            }
            Action::Match => {
                level.total_shares = level.total_shares.saturating_sub(u64::from(shares));
                LevelChange::Updated
            }
            Action::Remove => {
                level.total_shares = level.total_shares.saturating_sub(u64::from(shares));
                level.total_orders -= 1;
                if level.total_orders == 0 {
                    self.data.remove(&price);
                    LevelChange::LastRemoved
                } else {
                    LevelChange::Updated
                }
            }
        }
    }
}
