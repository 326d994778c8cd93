// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! # daybook
//!
//! A single-symbol, price-time-priority limit order book with
//! per-operation latency instrumentation.
//!
//! ## Features
//!
//! - **Order kinds**: GTC, FAK (fill-and-kill), FOK (fill-or-kill),
//!   GFD (good-for-day), Market
//! - **Price-time priority**: strict price priority across levels, FIFO
//!   within a level; amends forfeit time priority
//! - **O(1) level operations**: intrusive per-level FIFOs make fills and
//!   cancels constant-time once the level is found
//! - **Session close**: a background pruner cancels every GFD order at
//!   the configured close hour
//! - **Latency statistics**: every operation is timed and bucketed, with
//!   JSON/CSV reports
//!
//! ## Quick Start
//!
//! ```
//! use daybook::{Order, OrderBook, OrderId, OrderKind, Price, Side};
//!
//! let book = OrderBook::new();
//!
//! // A resting bid, then an ask that crosses it.
//! book.add_order(Order::limit(OrderId(1), OrderKind::Gtc, Side::Bid, Price(50_00), 10)?);
//! let trades = book.add_order(Order::limit(OrderId(2), OrderKind::Gtc, Side::Ask, Price(50_00), 4)?);
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].shares(), 4);
//! // The bid rests with its unfilled tail.
//! assert_eq!(book.number_of_orders(), 1);
//! # Ok::<(), daybook::BookError>(())
//! ```
//!
//! ## Prices
//!
//! Prices are fixed-point cents ([`Price`]), so `Price(50_00)` is $50.00.
//! Wire formats carry decimals; [`Price::from_decimal`] converts.
//!
//! ## Concurrency
//!
//! [`OrderBook`] serializes every mutating operation on one internal
//! lock and owns the GFD pruner thread; dropping it shuts the pruner
//! down and joins it. [`Book`] is the single-threaded core for callers
//! who manage their own synchronization.

mod aggregates;
mod book;
mod book_side;
mod clock;
mod engine;
mod error;
pub mod feed;
mod index;
mod kind;
mod latency;
mod level;
mod matching;
mod order;
mod pruner;
mod side;
pub mod sim;
mod snapshot;
mod stats;
mod trade;
mod types;

// Re-export public API
pub use book::Book;
pub use clock::{Clock, SystemClock};
pub use engine::{BookConfig, OrderBook, DEFAULT_CLOSE_HOUR};
pub use error::BookError;
pub use kind::OrderKind;
pub use order::Order;
pub use side::Side;
pub use snapshot::{BookSnapshot, LevelSnapshot};
pub use stats::{LatencyReport, LatencyRow};
pub use trade::{LogSink, Trade, TradeLeg, TradeSink};
pub use types::{OrderId, Price, Quantity};
