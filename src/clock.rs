//! Wall-clock abstraction for the session-close pruner.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of time-of-day, as consumed by the GFD pruner.
///
/// Only the offset into the current day matters; the pruner turns it into
/// a wait until the next close boundary. Implementations must be cheap
/// and callable from the pruner thread.
pub trait Clock: Send + Sync + 'static {
    /// Seconds elapsed since the most recent midnight of the session
    /// timezone.
    fn seconds_into_day(&self) -> u64;
}

/// The real clock. Sessions close on the UTC day, which has no DST
/// transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn seconds_into_day(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            % 86_400
    }
}
