//! Server configuration

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use estimator_lib::ErrorDetail;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the estimate, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// ONNX export of the trained pricing pipeline
    #[serde(default = "default_pipeline_path")]
    pub pipeline_path: PathBuf,

    /// Expected SHA-256 of the pipeline artifact, checked before loading
    #[serde(default)]
    pub pipeline_sha256: Option<String>,

    /// Option-domain document or reference dataset rows
    #[serde(default = "default_options_path")]
    pub options_path: PathBuf,

    /// Whether pipeline failure detail is returned to callers
    #[serde(default)]
    pub error_detail: ErrorDetail,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_pipeline_path() -> PathBuf {
    PathBuf::from("models/pipe.onnx")
}

fn default_options_path() -> PathBuf {
    PathBuf::from("data/options.json")
}

impl ServerConfig {
    /// Load configuration from an optional `estimator.*` file overlaid by
    /// `ESTIMATOR_*` environment variables
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("estimator").required(false))
            .add_source(config::Environment::with_prefix("ESTIMATOR"));
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
