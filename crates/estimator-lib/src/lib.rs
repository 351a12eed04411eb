//! Core library for laptop price estimation
//!
//! This crate provides:
//! - Option domains for the enumerated specification fields
//! - Feature encoding into the pipeline's training schema
//! - Pipeline inference and price decoding
//! - Health checks and observability

pub mod domains;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use domains::{NumericRange, OptionDomains};
pub use error::{ErrorKind, EstimateError, StartupError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EstimatorMetrics, StructuredLogger};
pub use predictor::{
    ErrorDetail, EstimatorConfig, OnnxPipeline, PriceEstimator, Predictor,
};
