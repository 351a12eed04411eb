//! Price server - laptop price estimation service
//!
//! Loads the option domains and the pricing pipeline once at startup and
//! serves estimates over HTTP. A load failure ends the process before the
//! port is bound.

use anyhow::{Context, Result};
use estimator_lib::{
    health::{components, HealthRegistry},
    EstimatorConfig, OnnxPipeline, OptionDomains, Predictor, PriceEstimator, StructuredLogger,
};
use price_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// One thread: each estimate runs to completion before the next starts
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        error_detail = ?config.error_detail,
        "Server configured"
    );

    let domains = Arc::new(
        OptionDomains::load(&config.options_path).context("Failed to load option domains")?,
    );
    let pipeline = OnnxPipeline::load(&config.pipeline_path, config.pipeline_sha256.as_deref())
        .context("Failed to load pipeline artifact")?;
    let model_version = pipeline.model_version().to_string();

    let estimator = Arc::new(PriceEstimator::new(
        domains.clone(),
        Arc::new(pipeline),
        EstimatorConfig {
            error_detail: config.error_detail,
        },
    ));

    let health_registry = HealthRegistry::new();
    health_registry
        .register(components::PIPELINE, Some(format!("model {}", model_version)))
        .await;
    health_registry
        .register(
            components::OPTION_DOMAINS,
            Some(format!("{} companies", domains.companies.len())),
        )
        .await;

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVER_VERSION, &model_version, domains.companies.len());

    let app_state = Arc::new(api::AppState::new(
        estimator,
        health_registry.clone(),
        logger.clone(),
    ));

    // Everything the estimator needs is loaded
    health_registry.mark_startup_complete(true).await;

    tokio::select! {
        result = api::serve(config.api_port, app_state) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
