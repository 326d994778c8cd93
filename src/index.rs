//! OrderIndex: O(1) lookup from order id to the live order and its
//! position within a price level.
//!
//! Each entry embeds the intrusive prev/next links of the per-level FIFO,
//! so the entry itself is the "position handle": a cancel reaches its
//! queue neighbours without walking the level.

use rustc_hash::FxHashMap;

use crate::order::Order;
use crate::types::OrderId;

/// A resting order plus its links into the level FIFO it sits in.
#[derive(Clone, Debug)]
pub(crate) struct IndexEntry {
    pub(crate) order: Order,
    /// Neighbour towards the level front, if any.
    pub(crate) prev: Option<OrderId>,
    /// Neighbour towards the level back, if any.
    pub(crate) next: Option<OrderId>,
}

/// All resting orders, keyed by id.
///
/// Every resting order appears in exactly one level queue and exactly one
/// entry here; filled, cancelled, and pruned orders appear in neither.
#[derive(Clone, Debug, Default)]
pub(crate) struct OrderIndex {
    entries: FxHashMap<OrderId, IndexEntry>,
}

impl OrderIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, id: OrderId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn get(&self, id: OrderId) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: OrderId) -> Option<&mut IndexEntry> {
        self.entries.get_mut(&id)
    }

    /// The order behind `id`, if it is resting.
    pub(crate) fn order(&self, id: OrderId) -> Option<&Order> {
        self.entries.get(&id).map(|entry| &entry.order)
    }

    /// Insert a new order with no queue links yet. The caller must have
    /// checked for duplicates; a clash here is a gateway bug.
    pub(crate) fn insert(&mut self, order: Order) {
        let id = order.id;
        let previous = self.entries.insert(
            id,
            IndexEntry {
                order,
                prev: None,
                next: None,
            },
        );
        debug_assert!(previous.is_none(), "order {id} inserted twice");
    }

    pub(crate) fn remove(&mut self, id: OrderId) -> Option<IndexEntry> {
        self.entries.remove(&id)
    }

    /// Iterate over all resting order ids, in no particular order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.entries.keys().copied()
    }

    /// Iterate over all resting orders, in no particular order.
    pub(crate) fn orders(&self) -> impl Iterator<Item = &Order> {
        self.entries.values().map(|entry| &entry.order)
    }
}
