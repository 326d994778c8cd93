//! Errors surfaced by order construction, amendment, and the stats writer.
//!
//! Recoverable admission refusals (duplicate id, unmatchable FAK,
//! unfillable FOK, market order with an empty opposite side) are not
//! errors: they are silent no-ops that return an empty trade list.

use thiserror::Error;

use crate::types::OrderId;

/// Failures that escape to the caller.
#[derive(Debug, Error)]
pub enum BookError {
    /// An order must carry a strictly positive price (market orders
    /// excepted, which receive a price on intake).
    #[error("order {order_id} must have a strictly positive price")]
    InvalidPrice {
        /// The offending order.
        order_id: OrderId,
    },

    /// An order must carry a strictly positive share count.
    #[error("order {order_id} must have a strictly positive share count")]
    ZeroShares {
        /// The offending order.
        order_id: OrderId,
    },

    /// The latency bookkeeping lost or double-counted samples.
    #[error("latency sample count {actual} does not match the expected {expected} updates")]
    SampleCountMismatch {
        /// Number of operations the caller processed.
        expected: usize,
        /// Samples actually recorded across all buckets.
        actual: usize,
    },

    /// Writing the latency statistics file failed.
    #[error("failed to write latency statistics")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_order() {
        let err = BookError::InvalidPrice {
            order_id: OrderId(7),
        };
        assert!(err.to_string().contains("O7"));

        let err = BookError::ZeroShares {
            order_id: OrderId(9),
        };
        assert!(err.to_string().contains("O9"));
    }

    #[test]
    fn sample_mismatch_reports_both_counts() {
        let err = BookError::SampleCountMismatch {
            expected: 100,
            actual: 99,
        };
        let msg = err.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains("100"));
    }
}
