//! Random load generation for exercising the book and its latency
//! instrumentation.
//!
//! Each update is an add, an amend, or a cancel, drawn from the profile's
//! mix. Prices and sizes follow clamped normal distributions so the flow
//! clusters around a mid without ever producing invalid orders. Amends
//! and cancels target a uniformly chosen resting order.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::engine::OrderBook;
use crate::kind::OrderKind;
use crate::order::Order;
use crate::side::Side;
use crate::types::{OrderId, Price, Quantity};

const KINDS: [OrderKind; 5] = [
    OrderKind::Gtc,
    OrderKind::Fak,
    OrderKind::Fok,
    OrderKind::Gfd,
    OrderKind::Market,
];

/// Mix and shape of the generated flow.
#[derive(Clone, Copy, Debug)]
pub struct LoadProfile {
    /// Probability an update is a new order.
    pub add_prob: f64,
    /// Probability an update is an amend; the remainder are cancels.
    pub amend_prob: f64,
    /// Mean of the share-count distribution.
    pub mean_shares: f64,
    /// Standard deviation of the share-count distribution.
    pub shares_sigma: f64,
    /// Mean of the decimal price distribution.
    pub mean_price: f64,
    /// Standard deviation of the decimal price distribution.
    pub price_sigma: f64,
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            add_prob: 0.3,
            amend_prob: 0.6,
            mean_shares: 50.0,
            shares_sigma: 50.0,
            mean_price: 30.0,
            price_sigma: 10.0,
        }
    }
}

/// Apply `updates` random operations to `book`. New orders take ids from
/// `next_order_id`, which is advanced past every id consumed.
pub fn run_random_updates<R: Rng + ?Sized>(
    book: &OrderBook,
    updates: usize,
    next_order_id: &mut u32,
    profile: &LoadProfile,
    rng: &mut R,
) {
    debug_assert!(profile.add_prob + profile.amend_prob <= 1.0);

    let shares_dist =
        Normal::new(profile.mean_shares, profile.shares_sigma).expect("shares sigma must be finite");
    let price_dist =
        Normal::new(profile.mean_price, profile.price_sigma).expect("price sigma must be finite");

    let draw_shares =
        |rng: &mut R| -> Quantity { (shares_dist.sample(rng) as i64).max(5) as Quantity };
    let draw_price = |rng: &mut R| -> f64 { price_dist.sample(rng).max(1.0) };

    for _ in 0..updates {
        let roll: f64 = rng.random();

        if roll < profile.add_prob {
            *next_order_id += 1;
            let id = OrderId(*next_order_id);
            let kind = KINDS[rng.random_range(0..KINDS.len())];
            let side = if rng.random_bool(0.5) {
                Side::Bid
            } else {
                Side::Ask
            };
            let shares = draw_shares(rng);
            let order = match kind {
                OrderKind::Market => Order::market(id, side, shares),
                kind => Order::limit(id, kind, side, Price::from_decimal(draw_price(rng)), shares),
            }
            .expect("clamped parameters are valid");
            book.add_order(order);
        } else if roll < profile.add_prob + profile.amend_prob {
            if let Some(id) = book.random_order_id_with(rng) {
                let price = Price::from_decimal(draw_price(rng));
                let shares = draw_shares(rng);
                book.amend_order(id, price, shares)
                    .expect("clamped parameters are valid");
            }
        } else if let Some(id) = book.random_order_id_with(rng) {
            book.cancel_order(id);
        }
    }
}
