//! GFD pruner: cancels all good-for-day orders at the session close.
//!
//! A single background thread sleeps on the shutdown condvar until the
//! next close boundary, then collects the resting GFD ids under the book
//! lock, releases it, and cancels them under a fresh acquisition. An id
//! that disappears between the two phases is harmless — cancel treats
//! absent ids as no-ops.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::debug;

use crate::book::CancelOrigin;
use crate::clock::Clock;
use crate::engine::Shared;

/// Slack added past the close boundary so the wake lands strictly after
/// it.
const CLOSE_SLACK: Duration = Duration::from_millis(100);

const SECONDS_PER_DAY: u64 = 86_400;

/// Time to wait until just past the next occurrence of
/// `close_hour:00:00`. At or past the boundary, the next occurrence is
/// tomorrow's.
pub(crate) fn delay_until_close(clock: &dyn Clock, close_hour: u32) -> Duration {
    let now = clock.seconds_into_day() % SECONDS_PER_DAY;
    let close = u64::from(close_hour) * 3_600;
    let seconds = if now >= close {
        close + SECONDS_PER_DAY - now
    } else {
        close - now
    };
    Duration::from_secs(seconds) + CLOSE_SLACK
}

/// Pruner thread body. Runs until the shutdown flag is raised or the
/// condvar is notified.
pub(crate) fn run(shared: &Shared, clock: &dyn Clock, close_hour: u32) {
    debug!(close_hour, "GFD pruner started");
    loop {
        let wait = delay_until_close(clock, close_hour);

        let ids = {
            let guard = shared.lock_book();
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
            let (guard, timeout) = match shared.close_signal.wait_timeout(guard, wait) {
                Ok(pair) => pair,
                Err(poisoned) => poisoned.into_inner(),
            };
            if shared.shutdown.load(Ordering::Acquire) || !timeout.timed_out() {
                return;
            }
            guard.gfd_order_ids()
        };

        if ids.is_empty() {
            continue;
        }
        debug!(count = ids.len(), "cancelling good-for-day orders at the session close");

        let mut book = shared.lock_book();
        for id in ids {
            book.cancel_internal(id, CancelOrigin::Pruner);
        }
    }
}
