//! Observability infrastructure for the price estimator
//!
//! Provides:
//! - Prometheus metrics (inference latency, estimate outcomes, model version)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, GaugeVec, Histogram, IntCounter,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EstimatorMetricsInner> = OnceLock::new();

struct EstimatorMetricsInner {
    inference_latency_seconds: Histogram,
    estimates_served: IntCounter,
    domain_errors: IntCounter,
    inference_errors: IntCounter,
    ppi_defaults: IntCounter,
    model_version_info: GaugeVec,
}

impl EstimatorMetricsInner {
    fn new() -> Self {
        Self {
            inference_latency_seconds: register_histogram!(
                "price_estimator_inference_latency_seconds",
                "Time spent running the pricing pipeline",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            estimates_served: register_int_counter!(
                "price_estimator_estimates_served_total",
                "Total number of successful price estimates"
            )
            .expect("Failed to register estimates_served"),

            domain_errors: register_int_counter!(
                "price_estimator_domain_errors_total",
                "Total number of requests rejected by input validation"
            )
            .expect("Failed to register domain_errors"),

            inference_errors: register_int_counter!(
                "price_estimator_inference_errors_total",
                "Total number of requests the pipeline could not price"
            )
            .expect("Failed to register inference_errors"),

            ppi_defaults: register_int_counter!(
                "price_estimator_ppi_defaults_total",
                "Total number of estimates made with the PPI sentinel"
            )
            .expect("Failed to register ppi_defaults"),

            model_version_info: register_gauge_vec!(
                "price_estimator_model_version_info",
                "Information about the currently loaded pipeline",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Estimator metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct EstimatorMetrics {
    _private: (),
}

impl Default for EstimatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EstimatorMetricsInner {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new)
    }

    pub fn observe_inference_latency(&self, duration_secs: f64) {
        self.inner().inference_latency_seconds.observe(duration_secs);
    }

    /// Number of inference calls timed so far
    pub fn inference_latency_samples(&self) -> u64 {
        self.inner().inference_latency_seconds.get_sample_count()
    }

    pub fn inc_estimates_served(&self) {
        self.inner().estimates_served.inc();
    }

    pub fn inc_domain_errors(&self) {
        self.inner().domain_errors.inc();
    }

    pub fn inc_inference_errors(&self) {
        self.inner().inference_errors.inc();
    }

    pub fn inc_ppi_defaults(&self) {
        self.inner().ppi_defaults.inc();
    }

    /// Update model version info
    pub fn set_model_version(&self, version: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Structured logger for estimator events
///
/// Provides consistent JSON-formatted logging for the lifecycle of the
/// service and for each request it answers.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_version: &str, companies: usize) {
        info!(
            event = "estimator_started",
            instance = %self.instance,
            service_version = %version,
            model_version = %model_version,
            companies = companies,
            "Price estimator started"
        );
    }

    /// Log a served estimate
    pub fn log_estimate(
        &self,
        company: &str,
        type_name: &str,
        price_value: f64,
        ppi_was_defaulted: bool,
        latency_ms: u128,
    ) {
        info!(
            event = "estimate_served",
            instance = %self.instance,
            company = %company,
            type_name = %type_name,
            price_value = price_value,
            ppi_was_defaulted = ppi_was_defaulted,
            latency_ms = latency_ms as u64,
            "Served price estimate"
        );
    }

    /// Log a rejected estimate
    pub fn log_rejection(&self, error_kind: &str, message: &str) {
        warn!(
            event = "estimate_rejected",
            instance = %self.instance,
            error_kind = %error_kind,
            message = %message,
            "Price estimate rejected"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "estimator_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Price estimator shutting down"
        );
    }
}
