//! OrderBook: the thread-safe façade.
//!
//! Owns the book core behind a single mutex, the GFD pruner thread, and
//! the shutdown protocol. Exactly two kinds of threads touch book state:
//! callers of the public operations here, and the pruner. Every mutating
//! path serializes on the one lock; operations are totally ordered by
//! their acquisition order.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use rand::Rng;

use crate::book::Book;
use crate::clock::{Clock, SystemClock};
use crate::error::BookError;
use crate::order::Order;
use crate::pruner;
use crate::snapshot::BookSnapshot;
use crate::stats::LatencyReport;
use crate::trade::{LogSink, Trade, TradeSink};
use crate::types::{OrderId, Price, Quantity};

/// Hour of day (0-23) at which good-for-day orders are cancelled.
pub const DEFAULT_CLOSE_HOUR: u32 = 16;

/// Tunables for an [`OrderBook`].
#[derive(Clone, Copy, Debug)]
pub struct BookConfig {
    /// Session close hour for the GFD pruner, on the clock's day.
    pub close_hour: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            close_hour: DEFAULT_CLOSE_HOUR,
        }
    }
}

/// State shared between the façade and the pruner thread.
pub(crate) struct Shared {
    pub(crate) book: Mutex<Book>,
    pub(crate) close_signal: Condvar,
    pub(crate) shutdown: AtomicBool,
}

impl Shared {
    /// Acquire the book lock, recovering the guard if another thread
    /// panicked while holding it.
    pub(crate) fn lock_book(&self) -> MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The public, thread-safe order book.
///
/// ```
/// use daybook::{Order, OrderBook, OrderId, OrderKind, Price, Side};
///
/// let book = OrderBook::new();
/// book.add_order(Order::limit(OrderId(1), OrderKind::Gtc, Side::Bid, Price(50_00), 10)?);
/// let trades = book.add_order(Order::limit(OrderId(2), OrderKind::Gtc, Side::Ask, Price(50_00), 4)?);
///
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].shares(), 4);
/// assert_eq!(book.number_of_orders(), 1);
/// # Ok::<(), daybook::BookError>(())
/// ```
pub struct OrderBook {
    shared: Arc<Shared>,
    pruner: Option<JoinHandle<()>>,
}

impl OrderBook {
    /// A book with the default configuration, the system clock, and the
    /// logging trade sink.
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// A book with the given configuration.
    pub fn with_config(config: BookConfig) -> Self {
        Self::with_collaborators(config, Arc::new(SystemClock), Box::new(LogSink))
    }

    /// A book with explicit collaborators; the seam used by tests to
    /// drive the pruner through a fake clock or capture trades.
    pub fn with_collaborators(
        config: BookConfig,
        clock: Arc<dyn Clock>,
        sink: Box<dyn TradeSink>,
    ) -> Self {
        assert!(
            config.close_hour < 24,
            "close_hour must be an hour of day (0-23), got {}",
            config.close_hour
        );

        let shared = Arc::new(Shared {
            book: Mutex::new(Book::with_trade_sink(sink)),
            close_signal: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let pruner = {
            let shared = Arc::clone(&shared);
            let close_hour = config.close_hour;
            thread::Builder::new()
                .name("gfd-pruner".into())
                .spawn(move || pruner::run(&shared, &*clock, close_hour))
                .expect("failed to spawn the GFD pruner thread")
        };

        Self {
            shared,
            pruner: Some(pruner),
        }
    }

    // === Gateway ===

    /// Submit an order; see [`Book::add`].
    pub fn add_order(&self, order: Order) -> Vec<Trade> {
        self.shared.lock_book().add(order)
    }

    /// Cancel a resting order; unknown ids are a no-op.
    pub fn cancel_order(&self, order_id: OrderId) {
        self.shared.lock_book().cancel(order_id);
    }

    /// Amend a resting order; see [`Book::amend`].
    pub fn amend_order(
        &self,
        order_id: OrderId,
        new_price: Price,
        new_shares: Quantity,
    ) -> Result<Vec<Trade>, BookError> {
        self.shared.lock_book().amend(order_id, new_price, new_shares)
    }

    // === Introspection ===

    /// Number of resting orders.
    pub fn number_of_orders(&self) -> usize {
        self.shared.lock_book().number_of_orders()
    }

    /// Whether `order_id` is resting.
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.shared.lock_book().contains(order_id)
    }

    /// Highest resting bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.shared.lock_book().best_bid()
    }

    /// Lowest resting ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.shared.lock_book().best_ask()
    }

    /// A uniformly chosen resting order id, for test harnesses.
    pub fn random_order_id(&self) -> Option<OrderId> {
        self.shared.lock_book().random_order_id()
    }

    /// As [`random_order_id`](Self::random_order_id), drawing from the
    /// caller's generator.
    pub fn random_order_id_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<OrderId> {
        self.shared.lock_book().random_order_id_with(rng)
    }

    /// Snapshot the top `depth` levels of each side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        self.shared.lock_book().snapshot(depth)
    }

    /// Print the current book to stdout.
    pub fn print_book(&self) {
        print!("{}", self.shared.lock_book().full_snapshot());
    }

    // === Latency statistics ===

    /// Drop all recorded latency samples.
    pub fn clear_latencies(&self) {
        self.shared.lock_book().clear_latencies();
    }

    /// Summarize the recorded latency samples.
    pub fn latency_report(&self) -> LatencyReport {
        self.shared.lock_book().latency_report()
    }

    /// Write the latency report to `path` — JSON for a `.json` extension,
    /// CSV otherwise. When `expected_updates` is given, fails if the
    /// recorded per-operation sample count differs from it.
    pub fn write_latency_stats(
        &self,
        path: impl AsRef<Path>,
        expected_updates: Option<usize>,
    ) -> Result<(), BookError> {
        let report = self.latency_report();

        if let Some(expected) = expected_updates {
            let actual = report.total_samples();
            if actual != expected {
                return Err(BookError::SampleCountMismatch { expected, actual });
            }
        }

        let path = path.as_ref();
        let text = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => report.to_json_string().map_err(std::io::Error::other)?,
            _ => report.to_csv_string(),
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrderBook {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.close_signal.notify_one();
        if let Some(handle) = self.pruner.take() {
            let _ = handle.join();
        }
    }
}
