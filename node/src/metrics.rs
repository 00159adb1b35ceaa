//! Prometheus metrics for the observer node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`]; [`NodeMetrics::encode`]
//! renders it in the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Messages whose writes were committed, by message type.
    pub messages_applied: IntCounterVec,
    /// Messages rejected by their handler, by error kind.
    pub messages_rejected: IntCounterVec,
    /// Ballots created by a first vote.
    pub ballots_created: IntCounter,
    /// Ballots that reached a final status.
    pub ballots_finalized: IntCounter,
    /// Ballots deleted by maturity GC.
    pub ballots_pruned: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Height of the last block applied.
    pub block_height: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent applying one block, in milliseconds.
    pub block_apply_time_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let messages_applied = register_int_counter_vec_with_registry!(
            Opts::new(
                "interop_messages_applied_total",
                "Messages applied and committed, by message type"
            ),
            &["type"],
            registry
        )?;

        let messages_rejected = register_int_counter_vec_with_registry!(
            Opts::new(
                "interop_messages_rejected_total",
                "Messages rejected by their handler, by error kind"
            ),
            &["kind"],
            registry
        )?;

        let ballots_created = register_int_counter_with_registry!(
            Opts::new("interop_ballots_created_total", "Ballots created by a first vote"),
            registry
        )?;

        let ballots_finalized = register_int_counter_with_registry!(
            Opts::new(
                "interop_ballots_finalized_total",
                "Ballots that reached a final status"
            ),
            registry
        )?;

        let ballots_pruned = register_int_counter_with_registry!(
            Opts::new(
                "interop_ballots_pruned_total",
                "Ballots deleted by maturity garbage collection"
            ),
            registry
        )?;

        let block_height = register_int_gauge_with_registry!(
            Opts::new("interop_block_height", "Height of the last applied block"),
            registry
        )?;

        let block_apply_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "interop_block_apply_time_ms",
                "Block application time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.1, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            messages_applied,
            messages_rejected,
            ballots_created,
            ballots_finalized,
            ballots_pruned,
            block_height,
            block_apply_time_ms,
        })
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| NodeError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_metrics() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.messages_applied.with_label_values(&["vote_inbound"]).inc();
        metrics.block_height.set(42);

        let text = metrics.encode().unwrap();
        assert!(text.contains("interop_messages_applied_total{type=\"vote_inbound\"} 1"));
        assert!(text.contains("interop_block_height 42"));
    }
}
