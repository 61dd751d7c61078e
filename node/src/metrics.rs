//! Prometheus metrics for reward distribution.
//!
//! [`DistributionMetrics`] owns a dedicated [`Registry`] that can be encoded
//! into the Prometheus text exposition format with [`DistributionMetrics::encode`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

pub struct DistributionMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub epochs_opened: IntCounter,
    pub epochs_closed: IntCounter,
    /// Reward records posted to the ledger.
    pub rewards_locked: IntCounter,
    /// Reward records moved to withdrawn.
    pub rewards_withdrawn: IntCounter,
    /// Beneficiaries skipped for missing too many votes.
    pub ineligible_beneficiaries: IntCounter,
    /// Beneficiaries aborted by a vote or balance source failure.
    pub source_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// 1 while a distribution window is open.
    pub window_open: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time to evaluate one batch of beneficiaries, in milliseconds.
    pub batch_duration_ms: Histogram,
}

impl DistributionMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let epochs_opened = register_int_counter_with_registry!(
            Opts::new("votereward_epochs_opened_total", "Distribution windows opened"),
            registry
        )?;
        let epochs_closed = register_int_counter_with_registry!(
            Opts::new("votereward_epochs_closed_total", "Distribution windows closed"),
            registry
        )?;
        let rewards_locked = register_int_counter_with_registry!(
            Opts::new("votereward_rewards_locked_total", "Reward records locked"),
            registry
        )?;
        let rewards_withdrawn = register_int_counter_with_registry!(
            Opts::new(
                "votereward_rewards_withdrawn_total",
                "Reward records withdrawn"
            ),
            registry
        )?;
        let ineligible_beneficiaries = register_int_counter_with_registry!(
            Opts::new(
                "votereward_ineligible_beneficiaries_total",
                "Beneficiaries that missed too many votes"
            ),
            registry
        )?;
        let source_failures = register_int_counter_with_registry!(
            Opts::new(
                "votereward_source_failures_total",
                "Beneficiaries aborted by an external source failure"
            ),
            registry
        )?;

        let window_open = register_int_gauge_with_registry!(
            Opts::new("votereward_window_open", "Whether a distribution window is open"),
            registry
        )?;

        // 0.1 ms → ~1.6 s
        let batch_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "votereward_batch_duration_ms",
                "Beneficiary batch evaluation time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.1, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            epochs_opened,
            epochs_closed,
            rewards_locked,
            rewards_withdrawn,
            ineligible_beneficiaries,
            source_failures,
            window_open,
            batch_duration_ms,
        })
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
