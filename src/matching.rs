//! Matching: the crossing loop and its admission probes.
//!
//! Price-time priority: the best-priced levels trade first, and within a
//! level the earliest arrival trades first. The loop runs after every
//! admitted add and drains every crossing before returning, so the book
//! is never crossed at rest.

use std::time::Instant;

use crate::aggregates::Action;
use crate::book::{Book, CancelOrigin};
use crate::kind::OrderKind;
use crate::latency::elapsed_us;
use crate::side::Side;
use crate::trade::{Trade, TradeLeg};
use crate::types::{OrderId, Price, Quantity};

impl Book {
    /// Whether an order of `side` at `price` has a marketable counterpart
    /// at the top of the opposite side.
    pub(crate) fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Bid => self.asks.best_price().is_some_and(|best| best <= price),
            Side::Ask => self.bids.best_price().is_some_and(|best| best >= price),
        }
    }

    /// Whether opposing resting volume at marketable prices covers
    /// `quantity`. Walks the opposite side from the top and stops at the
    /// first level that no longer crosses. FOK admission only.
    pub(crate) fn can_fully_fill(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        if !self.can_match(side, price) {
            return false;
        }

        let opposite = match side {
            Side::Bid => &self.asks,
            Side::Ask => &self.bids,
        };
        let mut needed = u64::from(quantity);
        for (&level_price, queue) in opposite.iter_best_to_worst() {
            let marketable = match side {
                Side::Bid => level_price <= price,
                Side::Ask => level_price >= price,
            };
            if !marketable {
                break;
            }
            for order in queue.iter(&self.index) {
                needed = needed.saturating_sub(u64::from(order.remaining_shares));
                if needed == 0 {
                    return true;
                }
            }
        }
        false
    }

    /// Cross the top of the book until it no longer crosses, emitting one
    /// trade per head-to-head fill, then sweep any partially filled FAK
    /// left at a head.
    pub(crate) fn match_crossing(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(best_bid), Some(best_ask)) = (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if best_bid < best_ask {
                break;
            }

            // Trade the two head orders until one of the levels drains.
            loop {
                let start = Instant::now();

                let Some(bid_id) = self.bids.get(best_bid).and_then(|q| q.front()) else {
                    break;
                };
                let Some(ask_id) = self.asks.get(best_ask).and_then(|q| q.front()) else {
                    break;
                };

                let bid_remaining = self.remaining(bid_id);
                let ask_remaining = self.remaining(ask_id);
                let traded = bid_remaining.min(ask_remaining);

                self.fill_head(bid_id, traded);
                self.fill_head(ask_id, traded);
                let bid_filled = traded == bid_remaining;
                let ask_filled = traded == ask_remaining;

                if bid_filled {
                    self.bids
                        .get_mut(best_bid)
                        .expect("best bid level exists")
                        .pop_front(&mut self.index);
                    self.index.remove(bid_id);
                }
                if ask_filled {
                    self.asks
                        .get_mut(best_ask)
                        .expect("best ask level exists")
                        .pop_front(&mut self.index);
                    self.index.remove(ask_id);
                }

                // Each leg reports its own order's limit price.
                let trade = Trade {
                    bid: TradeLeg {
                        order_id: bid_id,
                        price: best_bid,
                        shares: traded,
                    },
                    ask: TradeLeg {
                        order_id: ask_id,
                        price: best_ask,
                        shares: traded,
                    },
                };
                self.sink.on_trade(&trade);
                trades.push(trade);

                self.aggregates.update(
                    best_bid,
                    traded,
                    if bid_filled { Action::Remove } else { Action::Match },
                );
                self.aggregates.update(
                    best_ask,
                    traded,
                    if ask_filled { Action::Remove } else { Action::Match },
                );

                self.meter.record_match(elapsed_us(start));
            }

            // A drained level comes off its side before the next probe.
            if self.bids.get(best_bid).is_some_and(|q| q.is_empty()) {
                self.bids.remove_level(best_bid);
            }
            if self.asks.get(best_ask).is_some_and(|q| q.is_empty()) {
                self.asks.remove_level(best_ask);
            }
        }

        self.sweep_fak_tails();
        trades
    }

    fn remaining(&self, order_id: OrderId) -> Quantity {
        self.index
            .order(order_id)
            .expect("head order exists in index")
            .remaining_shares
    }

    fn fill_head(&mut self, order_id: OrderId, traded: Quantity) {
        self.index
            .get_mut(order_id)
            .expect("head order exists in index")
            .order
            .fill(traded);
    }

    /// A FAK that traded but could not finish is left at the head of its
    /// side once the opposite side runs dry; kill the remainder.
    fn sweep_fak_tails(&mut self) {
        for side in [Side::Bid, Side::Ask] {
            let book_side = match side {
                Side::Bid => &self.bids,
                Side::Ask => &self.asks,
            };
            let head = book_side
                .best_price()
                .and_then(|price| book_side.get(price))
                .and_then(|queue| queue.front());
            let Some(order_id) = head else {
                continue;
            };
            let order = self
                .index
                .order(order_id)
                .expect("head order exists in index");
            if order.kind == OrderKind::Fak && order.remaining_shares < order.initial_shares {
                tracing::debug!(%order_id, "sweeping partially filled FAK tail");
                self.cancel_internal(order_id, CancelOrigin::Sweep);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::types::Price;

    fn order(id: u32, kind: OrderKind, side: Side, price: i64, shares: Quantity) -> Order {
        Order::limit(OrderId(id), kind, side, Price(price), shares).unwrap()
    }

    fn book_with_asks(asks: &[(i64, Quantity)]) -> Book {
        let mut book = Book::new();
        for (i, &(price, shares)) in asks.iter().enumerate() {
            book.add(order(
                1000 + i as u32,
                OrderKind::Gtc,
                Side::Ask,
                price,
                shares,
            ));
        }
        book
    }

    // === can_match ===

    #[test]
    fn can_match_requires_a_crossing_top() {
        let book = book_with_asks(&[(41_00, 5)]);

        assert!(book.can_match(Side::Bid, Price(41_00)));
        assert!(book.can_match(Side::Bid, Price(42_00)));
        assert!(!book.can_match(Side::Bid, Price(40_00)));
        // No bids at all.
        assert!(!book.can_match(Side::Ask, Price(1_00)));
    }

    // === can_fully_fill ===

    #[test]
    fn can_fully_fill_accumulates_marketable_levels() {
        let book = book_with_asks(&[(40_00, 5), (41_00, 5), (45_00, 100)]);

        // 45.00 is beyond a 41.00 bid; only 10 shares are reachable.
        assert!(book.can_fully_fill(Side::Bid, Price(41_00), 10));
        assert!(!book.can_fully_fill(Side::Bid, Price(41_00), 11));
        assert!(book.can_fully_fill(Side::Bid, Price(45_00), 110));
    }

    #[test]
    fn can_fully_fill_false_without_any_match() {
        let book = book_with_asks(&[(41_00, 5)]);
        assert!(!book.can_fully_fill(Side::Bid, Price(40_00), 1));
    }

    // === FOK (S2) ===

    #[test]
    fn fok_fills_exactly_or_not_at_all() {
        let mut book = book_with_asks(&[(40_00, 8)]);

        let trades = book.add(order(3, OrderKind::Fok, Side::Bid, 40_00, 8));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].shares(), 8);
        assert_eq!(book.number_of_orders(), 0);
        book.check_consistency().unwrap();

        let mut book = book_with_asks(&[(40_00, 8)]);
        let trades = book.add(order(4, OrderKind::Fok, Side::Bid, 40_00, 10));
        assert!(trades.is_empty());
        assert_eq!(book.number_of_orders(), 1);
        assert_eq!(book.best_ask(), Some(Price(40_00)));
        book.check_consistency().unwrap();
    }

    // === FAK (S3) ===

    #[test]
    fn fak_partial_fill_sweeps_the_tail() {
        let mut book = book_with_asks(&[(40_00, 3)]);

        let trades = book.add(order(5, OrderKind::Fak, Side::Bid, 40_00, 10));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].shares(), 3);
        assert!(!book.contains(OrderId(5)));
        assert_eq!(book.number_of_orders(), 0);
        book.check_consistency().unwrap();
    }

    #[test]
    fn fak_without_counterpart_is_rejected() {
        let mut book = book_with_asks(&[(41_00, 5)]);

        let trades = book.add(order(5, OrderKind::Fak, Side::Bid, 40_00, 10));

        assert!(trades.is_empty());
        assert_eq!(book.number_of_orders(), 1);
        book.check_consistency().unwrap();
    }

    #[test]
    fn fully_filled_fak_needs_no_sweep() {
        let mut book = book_with_asks(&[(40_00, 10)]);

        let trades = book.add(order(5, OrderKind::Fak, Side::Bid, 40_00, 10));

        assert_eq!(trades.len(), 1);
        assert_eq!(book.number_of_orders(), 0);
        book.check_consistency().unwrap();
    }

    // === Market (S4) ===

    #[test]
    fn market_order_sweeps_to_the_worst_level() {
        let mut book = book_with_asks(&[(41_00, 2), (42_00, 3), (43_00, 4)]);

        let trades = book.add(Order::market(OrderId(6), Side::Bid, 8).unwrap());

        assert_eq!(trades.len(), 3);
        assert_eq!(
            trades
                .iter()
                .map(|t| (t.ask.price.0, t.shares()))
                .collect::<Vec<_>>(),
            vec![(41_00, 2), (42_00, 3), (43_00, 3)]
        );
        // The rewritten bid carried the worst ask price on every leg.
        assert!(trades.iter().all(|t| t.bid.price == Price(43_00)));

        assert!(!book.contains(OrderId(6)));
        assert_eq!(book.number_of_orders(), 1);
        let resting = book.order(OrderId(1002)).unwrap();
        assert_eq!(resting.price, Price(43_00));
        assert_eq!(resting.remaining_shares, 1);
        book.check_consistency().unwrap();
    }

    #[test]
    fn oversized_market_order_rests_as_gtc() {
        let mut book = book_with_asks(&[(41_00, 2)]);

        let trades = book.add(Order::market(OrderId(6), Side::Bid, 5).unwrap());

        assert_eq!(trades.len(), 1);
        let resting = book.order(OrderId(6)).unwrap();
        assert_eq!(resting.kind, OrderKind::Gtc);
        assert_eq!(resting.price, Price(41_00));
        assert_eq!(resting.remaining_shares, 3);
        book.check_consistency().unwrap();
    }

    #[test]
    fn market_order_with_empty_opposite_is_rejected() {
        let mut book = Book::new();

        let trades = book.add(Order::market(OrderId(6), Side::Bid, 5).unwrap());

        assert!(trades.is_empty());
        assert_eq!(book.number_of_orders(), 0);
    }

    // === Priority ===

    #[test]
    fn fifo_within_a_level() {
        let mut book = Book::new();
        book.add(order(1, OrderKind::Gtc, Side::Ask, 40_00, 3));
        book.add(order(2, OrderKind::Gtc, Side::Ask, 40_00, 4));
        book.add(order(3, OrderKind::Gtc, Side::Ask, 40_00, 5));

        let trades = book.add(order(4, OrderKind::Gtc, Side::Bid, 40_00, 10));

        assert_eq!(trades.len(), 3);
        assert_eq!(
            trades
                .iter()
                .map(|t| (t.ask.order_id.0, t.shares()))
                .collect::<Vec<_>>(),
            vec![(1, 3), (2, 4), (3, 3)]
        );
        // Order 3 keeps its unfilled tail.
        assert_eq!(book.order(OrderId(3)).unwrap().remaining_shares, 2);
        book.check_consistency().unwrap();
    }

    #[test]
    fn better_priced_levels_trade_first() {
        let mut book = Book::new();
        book.add(order(1, OrderKind::Gtc, Side::Bid, 98_00, 5));
        book.add(order(2, OrderKind::Gtc, Side::Bid, 100_00, 5));
        book.add(order(3, OrderKind::Gtc, Side::Bid, 99_00, 5));

        let trades = book.add(order(4, OrderKind::Gtc, Side::Ask, 98_00, 12));

        assert_eq!(
            trades
                .iter()
                .map(|t| t.bid.price.0)
                .collect::<Vec<_>>(),
            vec![100_00, 99_00, 98_00]
        );
        book.check_consistency().unwrap();
    }

    #[test]
    fn legs_report_their_own_prices() {
        let mut book = book_with_asks(&[(40_00, 5)]);

        let trades = book.add(order(2, OrderKind::Gtc, Side::Bid, 45_00, 5));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].bid.price, Price(45_00));
        assert_eq!(trades[0].ask.price, Price(40_00));
    }

    #[test]
    fn match_latency_sampled_per_trade() {
        let mut book = book_with_asks(&[(40_00, 3), (40_00, 4), (41_00, 5)]);

        let trades = book.add(order(2, OrderKind::Gtc, Side::Bid, 41_00, 12));

        assert_eq!(trades.len(), 3);
        assert_eq!(book.meter.matches.len(), 3);
    }
}
