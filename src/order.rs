//! Order representation and lifecycle

use crate::error::BookError;
use crate::kind::OrderKind;
use crate::side::Side;
use crate::types::{OrderId, Price, Quantity};

/// An order in the book.
///
/// Identity, kind, and side are fixed at construction. Only
/// `remaining_shares` (and, for market orders, `price` and `kind` during
/// intake) change afterwards. An order is destroyed when it is fully
/// filled, cancelled, swept as a FAK tail, or pruned at the session close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier, stable across amends.
    pub id: OrderId,
    /// Order kind. `Market` only before intake rewrites it to `Gtc`.
    pub kind: OrderKind,
    /// Bid or Ask.
    pub side: Side,
    /// Limit price. Zero only for a market order awaiting intake.
    pub price: Price,
    /// Share count at creation; never changes.
    pub initial_shares: Quantity,
    /// Shares still open. Monotonically non-increasing; zero exactly when
    /// the order is fully filled.
    pub remaining_shares: Quantity,
}

impl Order {
    /// Create a limit order.
    ///
    /// Returns an error for a non-positive price or a zero share count.
    /// Market orders from a feed that carries a (placeholder) price may
    /// also be built this way; intake replaces the price.
    pub fn limit(
        id: OrderId,
        kind: OrderKind,
        side: Side,
        price: Price,
        shares: Quantity,
    ) -> Result<Self, BookError> {
        if price.0 <= 0 {
            return Err(BookError::InvalidPrice { order_id: id });
        }
        if shares == 0 {
            return Err(BookError::ZeroShares { order_id: id });
        }
        Ok(Self {
            id,
            kind,
            side,
            price,
            initial_shares: shares,
            remaining_shares: shares,
        })
    }

    /// Create a market order. It carries no price until intake assigns
    /// the worst price on the opposite side.
    pub fn market(id: OrderId, side: Side, shares: Quantity) -> Result<Self, BookError> {
        if shares == 0 {
            return Err(BookError::ZeroShares { order_id: id });
        }
        Ok(Self {
            id,
            kind: OrderKind::Market,
            side,
            price: Price::ZERO,
            initial_shares: shares,
            remaining_shares: shares,
        })
    }

    /// Returns true once every share has traded.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_shares == 0
    }

    /// Reduce the open quantity by `shares` traded.
    ///
    /// # Panics
    ///
    /// Panics if `shares` exceeds the remaining quantity; that can only
    /// come from a matching-loop bug.
    pub(crate) fn fill(&mut self, shares: Quantity) {
        assert!(
            shares <= self.remaining_shares,
            "order {}: fill of {} shares exceeds the remaining {}",
            self.id,
            shares,
            self.remaining_shares
        );
        self.remaining_shares -= shares;
    }

    /// Turn a market order into a resting GTC at the given price.
    pub(crate) fn rewrite_to_gtc(&mut self, price: Price) {
        debug_assert!(price.0 > 0, "rewrite price must be positive");
        self.price = price;
        self.kind = OrderKind::Gtc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order(shares: Quantity) -> Order {
        Order::limit(OrderId(1), OrderKind::Gtc, Side::Bid, Price(100_00), shares).unwrap()
    }

    #[test]
    fn new_order_initial_state() {
        let order = make_order(100);

        assert_eq!(order.initial_shares, 100);
        assert_eq!(order.remaining_shares, 100);
        assert!(!order.is_filled());
    }

    #[test]
    fn zero_price_rejected() {
        let err = Order::limit(OrderId(3), OrderKind::Gtc, Side::Bid, Price::ZERO, 10);
        assert!(matches!(
            err,
            Err(BookError::InvalidPrice {
                order_id: OrderId(3)
            })
        ));
    }

    #[test]
    fn negative_price_rejected() {
        let err = Order::limit(OrderId(3), OrderKind::Gtc, Side::Ask, Price(-100), 10);
        assert!(matches!(err, Err(BookError::InvalidPrice { .. })));
    }

    #[test]
    fn zero_shares_rejected() {
        let err = Order::limit(OrderId(4), OrderKind::Gtc, Side::Bid, Price(100_00), 0);
        assert!(matches!(
            err,
            Err(BookError::ZeroShares {
                order_id: OrderId(4)
            })
        ));

        let err = Order::market(OrderId(5), Side::Ask, 0);
        assert!(matches!(err, Err(BookError::ZeroShares { .. })));
    }

    #[test]
    fn market_order_has_no_price() {
        let order = Order::market(OrderId(6), Side::Bid, 25).unwrap();
        assert_eq!(order.kind, OrderKind::Market);
        assert_eq!(order.price, Price::ZERO);
    }

    #[test]
    fn rewrite_to_gtc() {
        let mut order = Order::market(OrderId(6), Side::Bid, 25).unwrap();
        order.rewrite_to_gtc(Price(43_00));
        assert_eq!(order.kind, OrderKind::Gtc);
        assert_eq!(order.price, Price(43_00));
        assert_eq!(order.remaining_shares, 25);
    }

    #[test]
    fn partial_fill() {
        let mut order = make_order(100);

        order.fill(30);

        assert_eq!(order.remaining_shares, 70);
        assert_eq!(order.initial_shares, 100);
        assert!(!order.is_filled());
    }

    #[test]
    fn fills_accumulate_to_full() {
        let mut order = make_order(100);

        order.fill(30);
        order.fill(50);
        order.fill(20);

        assert_eq!(order.remaining_shares, 0);
        assert!(order.is_filled());
    }

    #[test]
    #[should_panic(expected = "exceeds the remaining")]
    fn fill_beyond_remaining_panics() {
        let mut order = make_order(100);
        order.fill(101);
    }
}
