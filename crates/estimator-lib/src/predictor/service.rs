//! Price estimation service
//!
//! Ties the encoder, the pipeline and the decoder together behind the single
//! function the front end calls. The service is stateless between calls:
//! option domains and the pipeline are shared read-only, and a failed call
//! is reported once and never retried.

use super::{FeatureEncoder, PriceDecoder, Predictor};
use crate::domains::OptionDomains;
use crate::error::{ErrorKind, EstimateError};
use crate::models::{CanonicalFeatureRecord, EstimateResponse, PriceEstimate, RawSpecInput};
use crate::observability::EstimatorMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Message returned in place of pipeline detail when detail is redacted
pub const REDACTED_INFERENCE_MESSAGE: &str = "The system could not produce an estimate";

/// How much pipeline failure detail reaches the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDetail {
    /// Return the underlying pipeline message
    #[default]
    Verbatim,
    /// Return a fixed message and only log the detail
    Redacted,
}

/// Configuration for the estimation service
#[derive(Debug, Clone, Default)]
pub struct EstimatorConfig {
    pub error_detail: ErrorDetail,
}

/// Successful estimate with the PPI fallback flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub price: PriceEstimate,
    pub ppi_defaulted: bool,
}

/// Encode → invoke → decode for one specification at a time
pub struct PriceEstimator {
    encoder: FeatureEncoder,
    predictor: Arc<dyn Predictor>,
    decoder: PriceDecoder,
    config: EstimatorConfig,
    metrics: EstimatorMetrics,
}

impl PriceEstimator {
    pub fn new(
        domains: Arc<OptionDomains>,
        predictor: Arc<dyn Predictor>,
        config: EstimatorConfig,
    ) -> Self {
        let metrics = EstimatorMetrics::new();
        metrics.set_model_version(predictor.model_version());
        Self {
            encoder: FeatureEncoder::new(domains),
            predictor,
            decoder: PriceDecoder::new(),
            config,
            metrics,
        }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn domains(&self) -> &OptionDomains {
        self.encoder.domains()
    }

    pub fn model_version(&self) -> &str {
        self.predictor.model_version()
    }

    /// Run the pipeline on an encoded record and decode its output.
    ///
    /// Any pipeline error is converted into `EstimateError::Inference`
    /// carrying the underlying message.
    pub fn predict(&self, record: &CanonicalFeatureRecord) -> Result<PriceEstimate, EstimateError> {
        let start = Instant::now();
        let outcome = self.predictor.predict(record);
        self.metrics
            .observe_inference_latency(start.elapsed().as_secs_f64());

        let log_price = outcome.map_err(|e| EstimateError::inference(format!("{:#}", e)))?;
        self.decoder.decode(log_price)
    }

    /// Encode and predict, returning the typed result
    pub fn estimate(&self, raw: &RawSpecInput) -> Result<Estimate, EstimateError> {
        let encoded = self.encoder.encode(raw)?;
        let price = self.predict(&encoded.record)?;
        Ok(Estimate {
            price,
            ppi_defaulted: encoded.ppi_defaulted,
        })
    }

    /// Caller-facing estimate: every outcome becomes a structured response
    pub fn estimate_price(&self, raw: &RawSpecInput) -> EstimateResponse {
        match self.estimate(raw) {
            Ok(estimate) => {
                self.metrics.inc_estimates_served();
                if estimate.ppi_defaulted {
                    self.metrics.inc_ppi_defaults();
                }
                debug!(
                    company = %raw.company,
                    type_name = %raw.type_name,
                    price = estimate.price.value,
                    ppi_defaulted = estimate.ppi_defaulted,
                    "Estimate produced"
                );
                EstimateResponse::success(estimate.price.value, estimate.ppi_defaulted)
            }
            Err(err) => {
                let kind = err.kind();
                match kind {
                    ErrorKind::DomainError => self.metrics.inc_domain_errors(),
                    ErrorKind::InferenceError => self.metrics.inc_inference_errors(),
                }
                warn!(error_kind = kind.as_str(), error = %err, "Estimate failed");
                EstimateResponse::failure(kind, self.caller_message(&err))
            }
        }
    }

    fn caller_message(&self, err: &EstimateError) -> String {
        match (err, self.config.error_detail) {
            (EstimateError::Inference(_), ErrorDetail::Redacted) => {
                REDACTED_INFERENCE_MESSAGE.to_string()
            }
            _ => err.to_string(),
        }
    }
}
