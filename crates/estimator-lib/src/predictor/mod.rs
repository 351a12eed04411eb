//! Price prediction engine
//!
//! The trained pipeline is an external artifact; everything here either
//! prepares its input or interprets its output.

mod features;
mod inference;
mod output;
mod service;


pub use features::{
    compute_ppi, encode_boolean, parse_resolution, validate_domain, EncodedFeatures,
    FeatureEncoder, PpiOutcome, PPI_SENTINEL,
};
pub use inference::{sha256_hex, OnnxPipeline};
pub use output::PriceDecoder;
pub use service::{
    ErrorDetail, Estimate, EstimatorConfig, PriceEstimator, REDACTED_INFERENCE_MESSAGE,
};

use crate::models::CanonicalFeatureRecord;
use anyhow::Result;

/// Trait for pipeline implementations
pub trait Predictor: Send + Sync {
    /// Run the pipeline on one record, returning the log-scaled price
    fn predict(&self, record: &CanonicalFeatureRecord) -> Result<f64>;

    /// Get current model version
    fn model_version(&self) -> &str;
}
