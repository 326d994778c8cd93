//! Book: the order gateway and the state it guards.
//!
//! `Book` is the single-threaded core: both book sides, the order index,
//! the per-level aggregates, and the latency meter. It performs no
//! locking of its own — the [`OrderBook`](crate::engine::OrderBook)
//! façade serializes access — so internal calls compose freely without
//! reentrancy flags.

use std::time::Instant;

use rand::Rng;
use tracing::debug;

use crate::aggregates::{Action, LevelAggregates, LevelChange};
use crate::book_side::BookSide;
use crate::error::BookError;
use crate::index::OrderIndex;
use crate::kind::OrderKind;
use crate::latency::{elapsed_us, CancelOutcome, LatencyMeter, LevelOutcome};
use crate::order::Order;
use crate::side::Side;
use crate::trade::{LogSink, Trade, TradeSink};
use crate::types::{OrderId, Price, Quantity};

/// Who asked for a cancel. Internal origins skip the Cancel latency
/// bucket: an amend is timed end-to-end by its add phase, and a FAK tail
/// sweep is part of the add that admitted the FAK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CancelOrigin {
    User,
    Pruner,
    Amend,
    Sweep,
}

impl CancelOrigin {
    fn records_latency(self) -> bool {
        matches!(self, CancelOrigin::User | CancelOrigin::Pruner)
    }
}

/// The book core: sides, index, aggregates, instrumentation.
pub struct Book {
    pub(crate) bids: BookSide,
    pub(crate) asks: BookSide,
    pub(crate) index: OrderIndex,
    pub(crate) aggregates: LevelAggregates,
    pub(crate) meter: LatencyMeter,
    pub(crate) sink: Box<dyn TradeSink>,
}

impl Book {
    /// An empty book that logs trades through `tracing`.
    pub fn new() -> Self {
        Self::with_trade_sink(Box::new(LogSink))
    }

    /// An empty book delivering trades to `sink`.
    pub fn with_trade_sink(sink: Box<dyn TradeSink>) -> Self {
        Self {
            bids: BookSide::new(Side::Bid),
            asks: BookSide::new(Side::Ask),
            index: OrderIndex::new(),
            aggregates: LevelAggregates::new(),
            meter: LatencyMeter::new(),
            sink,
        }
    }

    // === Gateway operations ===

    /// Submit an order. Returns the trades it produced, oldest first.
    ///
    /// Admission is decided per kind: FAK requires a marketable
    /// counterpart, FOK requires full opposing volume, market orders
    /// require a non-empty opposite side and are rewritten to GTC at its
    /// worst price. Refused orders (including duplicate ids) change
    /// nothing and return an empty list.
    pub fn add(&mut self, order: Order) -> Vec<Trade> {
        self.add_internal(order, None)
    }

    /// Cancel a resting order. Unknown ids are a no-op.
    pub fn cancel(&mut self, order_id: OrderId) {
        self.cancel_internal(order_id, CancelOrigin::User);
    }

    /// Amend a resting order to a new price and share count.
    ///
    /// Implemented as cancel-then-add with the same id, preserving the
    /// original kind and side; the order re-enters at the back of its new
    /// level and forfeits time priority. Unknown ids are a no-op
    /// returning no trades. Invalid parameters are rejected before any
    /// state changes.
    pub fn amend(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_shares: Quantity,
    ) -> Result<Vec<Trade>, BookError> {
        let start = Instant::now();

        if new_price.0 <= 0 {
            return Err(BookError::InvalidPrice { order_id });
        }
        if new_shares == 0 {
            return Err(BookError::ZeroShares { order_id });
        }

        let Some(entry) = self.index.get(order_id) else {
            debug!(%order_id, "amend of an unknown order, skipping");
            return Ok(Vec::new());
        };
        let (kind, side) = (entry.order.kind, entry.order.side);

        debug!(%order_id, %kind, %side, %new_price, new_shares, "amending order");

        self.cancel_internal(order_id, CancelOrigin::Amend);

        let order = Order::limit(order_id, kind, side, new_price, new_shares)?;
        let carry_us = elapsed_us(start);
        Ok(self.add_internal(order, Some(carry_us)))
    }

    pub(crate) fn add_internal(&mut self, mut order: Order, amend_carry_us: Option<f64>) -> Vec<Trade> {
        let start = Instant::now();
        let order_id = order.id;

        if amend_carry_us.is_none() {
            debug!(
                %order_id,
                kind = %order.kind,
                side = %order.side,
                price = %order.price,
                shares = order.remaining_shares,
                "adding order"
            );
        }

        if self.index.contains(order_id) {
            debug!(%order_id, "order id already exists, skipping");
            self.record_entry(order.kind, LevelOutcome::Rejected, amend_carry_us, start);
            return Vec::new();
        }

        match order.kind {
            OrderKind::Fak if !self.can_match(order.side, order.price) => {
                debug!(%order_id, "FAK order has no marketable counterpart, skipping");
                self.record_entry(order.kind, LevelOutcome::Rejected, amend_carry_us, start);
                return Vec::new();
            }
            OrderKind::Fok
                if !self.can_fully_fill(order.side, order.price, order.remaining_shares) =>
            {
                debug!(%order_id, "FOK order cannot be fully filled, skipping");
                self.record_entry(order.kind, LevelOutcome::Rejected, amend_carry_us, start);
                return Vec::new();
            }
            OrderKind::Market => {
                let worst = match order.side {
                    Side::Bid => self.asks.worst_price(),
                    Side::Ask => self.bids.worst_price(),
                };
                match worst {
                    Some(price) => order.rewrite_to_gtc(price),
                    None => {
                        debug!(%order_id, "market order with an empty opposite side, skipping");
                        self.record_entry(order.kind, LevelOutcome::Rejected, amend_carry_us, start);
                        return Vec::new();
                    }
                }
            }
            _ => {}
        }

        // Market orders were rewritten above; bucket under the kind the
        // order now carries.
        let (kind, side, price, shares) = (
            order.kind,
            order.side,
            order.price,
            order.remaining_shares,
        );

        self.index.insert(order);
        let book_side = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        book_side.get_or_create(price).push_back(&mut self.index, order_id);

        let change = self.aggregates.update(price, shares, Action::Add);
        let outcome = match change {
            LevelChange::NewLevel => LevelOutcome::NewLevel,
            _ => LevelOutcome::ExistingLevel,
        };
        self.record_entry(kind, outcome, amend_carry_us, start);

        self.match_crossing()
    }

    pub(crate) fn cancel_internal(&mut self, order_id: OrderId, origin: CancelOrigin) {
        let start = Instant::now();

        let Some(entry) = self.index.get(order_id) else {
            return;
        };
        let (side, price, remaining) = (
            entry.order.side,
            entry.order.price,
            entry.order.remaining_shares,
        );

        debug!(%order_id, ?origin, %price, "cancelling order");

        let book_side = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        let emptied = {
            let queue = book_side
                .get_mut(price)
                .expect("resting order has a price level");
            queue.unlink(&mut self.index, order_id);
            queue.is_empty()
        };
        if emptied {
            book_side.remove_level(price);
        }
        self.index.remove(order_id);

        let change = self.aggregates.update(price, remaining, Action::Remove);
        if origin.records_latency() {
            let outcome = match change {
                LevelChange::LastRemoved => CancelOutcome::LastInLevel,
                _ => CancelOutcome::NotLastInLevel,
            };
            self.meter.record_cancel(outcome, elapsed_us(start));
        }
    }

    fn record_entry(
        &mut self,
        kind: OrderKind,
        outcome: LevelOutcome,
        amend_carry_us: Option<f64>,
        start: Instant,
    ) {
        let us = elapsed_us(start);
        match amend_carry_us {
            None => self.meter.record_add(kind, outcome, us),
            Some(carry) => self.meter.record_amend(outcome, carry + us),
        }
    }

    // === Queries ===

    /// Number of resting orders across both sides.
    pub fn number_of_orders(&self) -> usize {
        self.index.len()
    }

    /// Whether `order_id` is resting.
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains(order_id)
    }

    /// The resting order behind `order_id`, if any.
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.index.order(order_id)
    }

    /// Highest resting bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Lowest resting ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// A uniformly chosen resting order id, for test harnesses.
    pub fn random_order_id(&self) -> Option<OrderId> {
        self.random_order_id_with(&mut rand::rng())
    }

    /// As [`random_order_id`](Self::random_order_id), drawing from the
    /// caller's generator.
    pub fn random_order_id_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<OrderId> {
        if self.index.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..self.index.len());
        self.index.ids().nth(pick)
    }

    /// Ids of all resting good-for-day orders (the pruner's collect
    /// phase).
    pub(crate) fn gfd_order_ids(&self) -> Vec<OrderId> {
        self.index
            .orders()
            .filter(|order| order.kind == OrderKind::Gfd)
            .map(|order| order.id)
            .collect()
    }

    // === Instrumentation ===

    /// Drop all recorded latency samples.
    pub fn clear_latencies(&mut self) {
        self.meter.clear();
    }

    /// Summarize the recorded latency samples.
    pub fn latency_report(&self) -> crate::stats::LatencyReport {
        self.meter.report()
    }

    // === Consistency checking (test support) ===

    /// Cross-check the aggregate map, the level queues, and the order
    /// index against each other, and verify the book is not crossed.
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut indexed = 0usize;
        let mut levels = 0usize;

        for book_side in [&self.bids, &self.asks] {
            let side = book_side.side();
            for (&price, queue) in book_side.iter_best_to_worst() {
                levels += 1;
                if queue.is_empty() {
                    return Err(format!("empty level at {price} on the {side} side"));
                }
                let mut orders = 0u32;
                let mut shares = 0u64;
                for order in queue.iter(&self.index) {
                    if order.side != side {
                        return Err(format!("order {} queued on the wrong side", order.id));
                    }
                    if order.price != price {
                        return Err(format!(
                            "order {} at {} queued under level {price}",
                            order.id, order.price
                        ));
                    }
                    if order.remaining_shares == 0 {
                        return Err(format!("fully filled order {} still rests", order.id));
                    }
                    orders += 1;
                    shares += u64::from(order.remaining_shares);
                    indexed += 1;
                }
                let Some(aggregate) = self.aggregates.get(price) else {
                    return Err(format!("no aggregate entry for level {price}"));
                };
                if aggregate.total_orders != orders || aggregate.total_shares != shares {
                    return Err(format!(
                        "aggregate skew at {price}: recorded {}x{} vs actual {orders}x{shares}",
                        aggregate.total_orders, aggregate.total_shares
                    ));
                }
            }
        }

        if indexed != self.index.len() {
            return Err(format!(
                "index holds {} orders but the queues hold {indexed}",
                self.index.len()
            ));
        }
        if self.aggregates.len() != levels {
            return Err(format!(
                "{} aggregate entries for {levels} live levels",
                self.aggregates.len()
            ));
        }
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return Err(format!("book is crossed at rest: {bid} >= {ask}"));
            }
        }
        Ok(())
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}
