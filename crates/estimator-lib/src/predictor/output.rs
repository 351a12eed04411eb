//! Pipeline output decoding
//!
//! The pipeline was trained on log-scaled prices, so its raw output has to be
//! mapped back with `exp` exactly once before it means anything as a price.

use crate::error::EstimateError;
use crate::models::PriceEstimate;

/// Maps raw pipeline outputs back into currency units
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceDecoder;

impl PriceDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Inverse of the training-time target transform
    pub fn inverse_transform(&self, log_price: f64) -> f64 {
        log_price.exp()
    }

    /// Decode a log-scaled output, rejecting non-finite or non-positive prices
    pub fn decode(&self, log_price: f64) -> Result<PriceEstimate, EstimateError> {
        let value = self.inverse_transform(log_price);
        if !value.is_finite() || value <= 0.0 {
            return Err(EstimateError::inference(format!(
                "pipeline output {} decodes to unusable price {}",
                log_price, value
            )));
        }
        Ok(PriceEstimate { value })
    }
}
