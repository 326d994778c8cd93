//! Trade events and the sink that receives them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{OrderId, Price, Quantity};

/// One side of a completed trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLeg {
    /// The order that participated in this leg.
    pub order_id: OrderId,
    /// That order's own limit price.
    pub price: Price,
    /// Shares exchanged.
    pub shares: Quantity,
}

/// A completed trade between the heads of the best bid and best ask levels.
///
/// Each leg reports its own order's limit price rather than a single cross
/// price, so when an aggressive bid lifts a cheaper ask the two legs
/// disagree. Consumers wanting a single print should take the resting
/// order's leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Buy-side leg.
    pub bid: TradeLeg,
    /// Sell-side leg.
    pub ask: TradeLeg,
}

impl Trade {
    /// Shares exchanged (identical on both legs).
    #[inline]
    pub fn shares(&self) -> Quantity {
        self.bid.shares
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shares: bid {} @ {} / ask {} @ {}",
            self.shares(),
            self.bid.order_id,
            self.bid.price,
            self.ask.order_id,
            self.ask.price
        )
    }
}

/// Receives each trade as the matching loop produces it.
///
/// Trades emitted within one `add` are delivered contiguously and in
/// matching-loop order, under the book lock.
pub trait TradeSink: Send {
    /// Called once per trade.
    fn on_trade(&mut self, trade: &Trade);
}

/// Default sink: logs each trade through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TradeSink for LogSink {
    fn on_trade(&mut self, trade: &Trade) {
        tracing::debug!(%trade, "trade");
    }
}
