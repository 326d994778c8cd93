//! LevelQueue: the FIFO of resting orders at a single price.
//!
//! The queue stores only head/tail ids; the prev/next links live inside
//! the [`OrderIndex`](crate::index::OrderIndex) entries. Push-back,
//! pop-front, and removal at an arbitrary position are all O(1).

use crate::index::OrderIndex;
use crate::order::Order;
use crate::types::{OrderId, Price};

/// FIFO of order ids at one price. Insertion at the tail only; removal at
/// the head (fills) or at any position (cancels).
#[derive(Clone, Debug)]
pub(crate) struct LevelQueue {
    price: Price,
    head: Option<OrderId>,
    tail: Option<OrderId>,
    len: usize,
}

impl LevelQueue {
    pub(crate) fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The id at the front of the queue (next to trade).
    #[inline]
    pub(crate) fn front(&self) -> Option<OrderId> {
        self.head
    }

    /// Append `id` at the tail. The id must already be in the index with
    /// cleared links.
    pub(crate) fn push_back(&mut self, index: &mut OrderIndex, id: OrderId) {
        let tail = self.tail;
        {
            let entry = index.get_mut(id).expect("queued order exists in index");
            entry.prev = tail;
            entry.next = None;
        }
        match tail {
            Some(tail_id) => {
                index
                    .get_mut(tail_id)
                    .expect("queue tail exists in index")
                    .next = Some(id);
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlink and return the front id. The entry stays in the index; the
    /// caller removes it once done with the order.
    pub(crate) fn pop_front(&mut self, index: &mut OrderIndex) -> Option<OrderId> {
        let id = self.head?;
        self.unlink(index, id);
        Some(id)
    }

    /// Unlink `id` from anywhere in the queue in O(1) via its stored
    /// links. `id` must belong to this queue.
    pub(crate) fn unlink(&mut self, index: &mut OrderIndex, id: OrderId) {
        let (prev, next) = {
            let entry = index.get_mut(id).expect("unlinked order exists in index");
            let links = (entry.prev, entry.next);
            entry.prev = None;
            entry.next = None;
            links
        };

        match prev {
            Some(prev_id) => {
                index
                    .get_mut(prev_id)
                    .expect("queue predecessor exists in index")
                    .next = next;
            }
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                index
                    .get_mut(next_id)
                    .expect("queue successor exists in index")
                    .prev = prev;
            }
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Walk the queue front to back.
    pub(crate) fn iter<'a>(&self, index: &'a OrderIndex) -> LevelIter<'a> {
        LevelIter {
            index,
            cursor: self.head,
        }
    }
}

/// Iterator over the orders of one level, front to back.
pub(crate) struct LevelIter<'a> {
    index: &'a OrderIndex,
    cursor: Option<OrderId>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let entry = self.index.get(id).expect("queued order exists in index");
        self.cursor = entry.next;
        Some(&entry.order)
    }
}
