//! ONNX pipeline inference using tract
//!
//! Runs the exported price pipeline (categorical encoding + regression) on a
//! single record. The artifact takes one input per training column, named
//! after the column: categorical columns as `string[1, 1]`, numeric columns as
//! `float32[1, 1]`. Output 0 holds the log-scaled price.

use super::Predictor;
use crate::error::StartupError;
use crate::models::{CanonicalFeatureRecord, FeatureValue, FEATURE_COLUMNS};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 100;

/// Columns fed to the graph as strings rather than floats
const CATEGORICAL_COLUMNS: [&str; 5] = ["Company", "TypeName", "Cpu brand", "Gpu brand", "os"];

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Price pipeline loaded from an ONNX artifact
pub struct OnnxPipeline {
    model: TractModel,
    model_version: String,
}

impl OnnxPipeline {
    /// Load the pipeline from artifact bytes
    pub fn from_bytes(model_bytes: &[u8], model_version: impl Into<String>) -> Result<Self, StartupError> {
        let model = Self::load_model(model_bytes)
            .map_err(|e| StartupError::Pipeline(format!("{:#}", e)))?;
        Ok(Self {
            model,
            model_version: model_version.into(),
        })
    }

    /// Load the pipeline from a file, optionally checking its SHA-256 digest.
    ///
    /// The model version is the first 12 hex digits of the digest.
    pub fn load(path: impl AsRef<Path>, expected_sha256: Option<&str>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| StartupError::Io {
            what: "pipeline artifact",
            path: path.to_path_buf(),
            source,
        })?;

        let checksum = sha256_hex(&bytes);
        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&checksum) {
                return Err(StartupError::Checksum {
                    expected: expected.to_string(),
                    actual: checksum,
                });
            }
        }

        let pipeline = Self::from_bytes(&bytes, &checksum[..12])?;
        info!(
            path = %path.display(),
            size_bytes = bytes.len(),
            model_version = %pipeline.model_version,
            "Loaded pipeline artifact"
        );
        Ok(pipeline)
    }

    /// Parse the graph, check its inputs against the training columns and
    /// optimize it for single-row inference
    fn load_model(model_bytes: &[u8]) -> Result<TractModel> {
        let mut model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?;

        let input_names: Vec<String> = model
            .input_outlets()?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect();
        if input_names != FEATURE_COLUMNS {
            anyhow::bail!(
                "Model inputs {:?} do not match feature columns {:?}",
                input_names,
                FEATURE_COLUMNS
            );
        }

        for (ix, column) in FEATURE_COLUMNS.iter().enumerate() {
            let fact = if CATEGORICAL_COLUMNS.contains(column) {
                String::fact([1, 1])
            } else {
                f32::fact([1, 1])
            };
            model = model
                .with_input_fact(ix, fact.into())
                .with_context(|| format!("Failed to set input shape for {}", column))?;
        }

        let model = model
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert a record into one single-cell tensor per column
    fn record_to_inputs(record: &CanonicalFeatureRecord) -> TVec<TValue> {
        record
            .columns()
            .iter()
            .map(|(_, value)| {
                let tensor: Tensor = match value {
                    FeatureValue::Categorical(text) => {
                        tract_ndarray::arr2(&[[text.to_string()]]).into()
                    }
                    FeatureValue::Numeric(number) => tract_ndarray::arr2(&[[*number as f32]]).into(),
                };
                tensor.into()
            })
            .collect()
    }
}

impl Predictor for OnnxPipeline {
    fn predict(&self, record: &CanonicalFeatureRecord) -> Result<f64> {
        let start = Instant::now();

        let inputs = Self::record_to_inputs(record);
        let result = self.model.run(inputs)?;
        let output = result.first().context("No output from model")?;
        let log_price = first_value(output)?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(log_price)
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

/// First element of an output tensor, whatever its float width
fn first_value(output: &Tensor) -> Result<f64> {
    let values = output
        .cast_to::<f64>()
        .with_context(|| format!("Model output of type {:?} is not numeric", output.datum_type()))?;
    values
        .as_slice::<f64>()?
        .first()
        .copied()
        .context("Model output is empty")
}

/// Lowercase hex SHA-256 of the artifact bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
