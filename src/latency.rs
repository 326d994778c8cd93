//! LatencyMeter: classifies mutating operations and records elapsed time.
//!
//! Every user-visible operation files exactly one elapsed-microseconds
//! sample (plus one Match sample per crossing-loop iteration):
//!
//! - **Add**: bucketed by `(order kind, level outcome)`. All admission
//!   refusals land in the `Rejected` outcome.
//! - **Amend**: one end-to-end sample bucketed by the outcome of the
//!   internal add; the cancel phase's elapsed time is folded in. The
//!   internal cancel records nothing on its own.
//! - **Cancel**: bucketed by whether the order was the last at its level.
//!   Cancels driven by amends and FAK tail sweeps record nothing.
//! - **Match**: a single bucket, one sample per trade.
//!
//! The sum of Add + Amend + Cancel sample counts therefore equals the
//! number of user operations processed, which the stats writer can check
//! against an expected update count.

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::kind::OrderKind;

/// Elapsed microseconds since `start`.
#[inline]
pub(crate) fn elapsed_us(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e6
}

/// What an add (or the add phase of an amend) did to its price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LevelOutcome {
    /// The order joined a level that already existed.
    ExistingLevel,
    /// The order opened a new level.
    NewLevel,
    /// The order was refused admission; no level was touched.
    Rejected,
}

impl LevelOutcome {
    pub(crate) fn label(self) -> &'static str {
        match self {
            LevelOutcome::ExistingLevel => "existing_limit_level",
            LevelOutcome::NewLevel => "new_limit_level",
            LevelOutcome::Rejected => "rejected",
        }
    }
}

/// Whether a cancel emptied its price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CancelOutcome {
    /// The cancelled order was the last one at its price.
    LastInLevel,
    /// Other orders remain at the price.
    NotLastInLevel,
}

impl CancelOutcome {
    pub(crate) fn label(self) -> &'static str {
        match self {
            CancelOutcome::LastInLevel => "last_in_limit_level",
            CancelOutcome::NotLastInLevel => "not_last_in_limit_level",
        }
    }
}

/// Collected samples, bucketed per the taxonomy above. Values are
/// microseconds.
#[derive(Clone, Debug, Default)]
pub struct LatencyMeter {
    pub(crate) add: FxHashMap<(OrderKind, LevelOutcome), Vec<f64>>,
    pub(crate) amend: FxHashMap<LevelOutcome, Vec<f64>>,
    pub(crate) cancel: FxHashMap<CancelOutcome, Vec<f64>>,
    pub(crate) matches: Vec<f64>,
}

impl LatencyMeter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_add(&mut self, kind: OrderKind, outcome: LevelOutcome, us: f64) {
        self.add.entry((kind, outcome)).or_default().push(us);
    }

    pub(crate) fn record_amend(&mut self, outcome: LevelOutcome, us: f64) {
        self.amend.entry(outcome).or_default().push(us);
    }

    pub(crate) fn record_cancel(&mut self, outcome: CancelOutcome, us: f64) {
        self.cancel.entry(outcome).or_default().push(us);
    }

    pub(crate) fn record_match(&mut self, us: f64) {
        self.matches.push(us);
    }

    /// Drop every recorded sample.
    pub(crate) fn clear(&mut self) {
        self.add.clear();
        self.amend.clear();
        self.cancel.clear();
        self.matches.clear();
    }

    /// Samples attributable to user operations: Add + Amend + Cancel.
    /// Match samples are per-trade, not per-operation, and are excluded.
    pub(crate) fn operation_samples(&self) -> usize {
        self.add.values().map(Vec::len).sum::<usize>()
            + self.amend.values().map(Vec::len).sum::<usize>()
            + self.cancel.values().map(Vec::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_land_in_their_buckets() {
        let mut meter = LatencyMeter::new();

        meter.record_add(OrderKind::Gtc, LevelOutcome::NewLevel, 1.0);
        meter.record_add(OrderKind::Gtc, LevelOutcome::NewLevel, 2.0);
        meter.record_add(OrderKind::Fak, LevelOutcome::Rejected, 3.0);
        meter.record_amend(LevelOutcome::ExistingLevel, 4.0);
        meter.record_cancel(CancelOutcome::LastInLevel, 5.0);
        meter.record_match(6.0);

        assert_eq!(
            meter.add[&(OrderKind::Gtc, LevelOutcome::NewLevel)],
            vec![1.0, 2.0]
        );
        assert_eq!(
            meter.add[&(OrderKind::Fak, LevelOutcome::Rejected)],
            vec![3.0]
        );
        assert_eq!(meter.amend.len(), 1);
        assert_eq!(meter.cancel.len(), 1);
        assert_eq!(meter.matches.len(), 1);
    }

    #[test]
    fn operation_samples_excludes_matches() {
        let mut meter = LatencyMeter::new();
        meter.record_add(OrderKind::Gtc, LevelOutcome::NewLevel, 1.0);
        meter.record_amend(LevelOutcome::NewLevel, 1.0);
        meter.record_cancel(CancelOutcome::NotLastInLevel, 1.0);
        meter.record_match(1.0);
        meter.record_match(1.0);

        assert_eq!(meter.operation_samples(), 3);
    }

    #[test]
    fn clear_drops_everything() {
        let mut meter = LatencyMeter::new();
        meter.record_add(OrderKind::Gtc, LevelOutcome::NewLevel, 1.0);
        meter.record_match(1.0);

        meter.clear();

        assert_eq!(meter.operation_samples(), 0);
        assert!(meter.matches.is_empty());
    }

    #[test]
    fn elapsed_is_non_negative() {
        let start = Instant::now();
        assert!(elapsed_us(start) >= 0.0);
    }
}
