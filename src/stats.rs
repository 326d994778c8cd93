//! Latency statistics: per-bucket summaries and their serialized forms.
//!
//! A report carries one row per populated bucket with the mean and
//! population variance of the samples. Two encodings are produced from
//! the same rows: a JSON object keyed `Add` / `Amend` / `Cancel` /
//! `Match`, and a flat CSV.

use serde::Serialize;

use crate::kind::OrderKind;
use crate::latency::LatencyMeter;

/// Summary of one latency bucket.
#[derive(Clone, Debug, Serialize)]
pub struct LatencyRow {
    /// Order kind for Add buckets; absent elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_kind: Option<OrderKind>,
    /// What happened to the price level (`existing_limit_level`,
    /// `new_limit_level`, `rejected`, `last_in_limit_level`,
    /// `not_last_in_limit_level`, or `none` for Match).
    pub limit_level_status: &'static str,
    /// Mean elapsed time in microseconds.
    pub mean_latency_us: f64,
    /// Population variance of the elapsed times.
    pub latency_variance_us: f64,
    /// Number of samples in the bucket.
    pub sample_count: usize,
}

/// All buckets, grouped by operation.
#[derive(Clone, Debug, Serialize)]
pub struct LatencyReport {
    #[serde(rename = "Add")]
    pub add: Vec<LatencyRow>,
    #[serde(rename = "Amend")]
    pub amend: Vec<LatencyRow>,
    #[serde(rename = "Cancel")]
    pub cancel: Vec<LatencyRow>,
    #[serde(rename = "Match")]
    pub match_trades: LatencyRow,
}

impl LatencyReport {
    /// Samples across the Add, Amend, and Cancel buckets — one per user
    /// operation. Match samples are per-trade and excluded.
    pub fn total_samples(&self) -> usize {
        self.add
            .iter()
            .chain(&self.amend)
            .chain(&self.cancel)
            .map(|row| row.sample_count)
            .sum()
    }

    /// Pretty-printed JSON encoding.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Flat CSV encoding, one row per bucket.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::from(
            "operation,order_kind,limit_level_status,mean_latency_us,latency_variance_us,sample_count\n",
        );
        let mut push = |operation: &str, row: &LatencyRow| {
            let kind = row
                .order_kind
                .map(|kind| kind.to_string())
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{},{},{:.3},{:.3},{}\n",
                operation,
                kind,
                row.limit_level_status,
                row.mean_latency_us,
                row.latency_variance_us,
                row.sample_count
            ));
        };
        for row in &self.add {
            push("Add", row);
        }
        for row in &self.amend {
            push("Amend", row);
        }
        for row in &self.cancel {
            push("Cancel", row);
        }
        push("Match", &self.match_trades);
        out
    }
}

/// Mean and population variance; `(0, 0)` for an empty bucket.
fn mean_variance(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|sample| (sample - mean) * (sample - mean))
        .sum::<f64>()
        / n;
    (mean, variance)
}

fn row(order_kind: Option<OrderKind>, status: &'static str, samples: &[f64]) -> LatencyRow {
    let (mean_latency_us, latency_variance_us) = mean_variance(samples);
    LatencyRow {
        order_kind,
        limit_level_status: status,
        mean_latency_us,
        latency_variance_us,
        sample_count: samples.len(),
    }
}

impl LatencyMeter {
    /// Summarize the recorded samples. Row order is stable (sorted by
    /// kind and outcome) regardless of hash-map iteration order.
    pub fn report(&self) -> LatencyReport {
        let mut add_keys: Vec<_> = self.add.keys().copied().collect();
        add_keys.sort_unstable();
        let add = add_keys
            .iter()
            .map(|&(kind, outcome)| row(Some(kind), outcome.label(), &self.add[&(kind, outcome)]))
            .collect();

        let mut amend_keys: Vec<_> = self.amend.keys().copied().collect();
        amend_keys.sort_unstable();
        let amend = amend_keys
            .iter()
            .map(|&outcome| row(None, outcome.label(), &self.amend[&outcome]))
            .collect();

        let mut cancel_keys: Vec<_> = self.cancel.keys().copied().collect();
        cancel_keys.sort_unstable();
        let cancel = cancel_keys
            .iter()
            .map(|&outcome| row(None, outcome.label(), &self.cancel[&outcome]))
            .collect();

        LatencyReport {
            add,
            amend,
            cancel,
            match_trades: row(None, "none", &self.matches),
        }
    }
}
