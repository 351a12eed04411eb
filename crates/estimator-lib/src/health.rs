//! Liveness and readiness state for the estimator
//!
//! Both startup loads (pipeline and option domains) register here. After
//! startup the pipeline entry follows inference outcomes: a failure marks it
//! degraded with a running failure count, the next success restores it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Names of the tracked components
pub mod components {
    pub const PIPELINE: &str = "pipeline";
    pub const OPTION_DOMAINS: &str = "option_domains";
}

/// Health status of a component, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Serving, but the most recent inference failed
    Degraded,
    /// Cannot serve
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    /// Version or size detail while healthy, failure cause otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub consecutive_failures: u32,
    pub last_check_timestamp: i64,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>, consecutive_failures: u32) -> Self {
        Self {
            status,
            message,
            consecutive_failures,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy(detail: Option<String>) -> Self {
        Self::new(ComponentStatus::Healthy, detail, 0)
    }

    pub fn unhealthy(cause: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Unhealthy, Some(cause.into()), 0)
    }
}

/// Body of the liveness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components; healthy when none are registered
    pub fn compute_status(components: &BTreeMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|health| health.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy)
    }
}

/// Body of the readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    components: BTreeMap<String, ComponentHealth>,
    /// Detail each component registered with, restored on recovery
    details: BTreeMap<String, Option<String>>,
    startup_complete: bool,
}

/// Shared view of component health, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a component loaded at startup
    pub async fn register(&self, name: &str, detail: Option<String>) {
        let mut state = self.state.write().await;
        state.details.insert(name.to_string(), detail.clone());
        state
            .components
            .insert(name.to_string(), ComponentHealth::healthy(detail));
    }

    /// Flip readiness once every startup load has succeeded
    pub async fn mark_startup_complete(&self, complete: bool) {
        self.state.write().await.startup_complete = complete;
    }

    /// Restore the pipeline after a successful inference
    pub async fn record_inference_success(&self) {
        let mut state = self.state.write().await;
        let degraded = state
            .components
            .get(components::PIPELINE)
            .is_some_and(|h| h.status == ComponentStatus::Degraded);
        if degraded {
            let detail = state.details.get(components::PIPELINE).cloned().flatten();
            state
                .components
                .insert(components::PIPELINE.to_string(), ComponentHealth::healthy(detail));
        }
    }

    /// Degrade the pipeline after a failed inference, counting the streak
    pub async fn record_inference_failure(&self, cause: &str) {
        let mut state = self.state.write().await;
        let current = state.components.get(components::PIPELINE);
        if current.is_some_and(|h| h.status == ComponentStatus::Unhealthy) {
            return;
        }
        let failures = current.map_or(0, |h| h.consecutive_failures) + 1;
        state.components.insert(
            components::PIPELINE.to_string(),
            ComponentHealth::new(
                ComponentStatus::Degraded,
                Some(format!("last inference failed: {}", cause)),
                failures,
            ),
        );
    }

    pub async fn set_unhealthy(&self, name: &str, cause: impl Into<String>) {
        self.state
            .write()
            .await
            .components
            .insert(name.to_string(), ComponentHealth::unhealthy(cause));
    }

    pub async fn status(&self, name: &str) -> Option<ComponentStatus> {
        self.state.read().await.components.get(name).map(|h| h.status)
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        HealthResponse {
            status: HealthResponse::compute_status(&components),
            components,
        }
    }

    /// Ready after startup, for as long as nothing is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;
        let reason = if !state.startup_complete {
            Some("Estimator not yet initialized".to_string())
        } else {
            state
                .components
                .iter()
                .find(|(_, h)| h.status == ComponentStatus::Unhealthy)
                .map(|(name, _)| format!("{} is unhealthy", name))
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn started_registry() -> HealthRegistry {
        let registry = HealthRegistry::new();
        registry
            .register(components::PIPELINE, Some("model 0123456789ab".to_string()))
            .await;
        registry
            .register(components::OPTION_DOMAINS, Some("19 companies".to_string()))
            .await;
        registry.mark_startup_complete(true).await;
        registry
    }

    #[tokio::test]
    async fn test_empty_registry_is_healthy_but_not_ready() {
        let registry = HealthRegistry::new();

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("Estimator not yet initialized")
        );
    }

    #[tokio::test]
    async fn test_registered_components_report_detail() {
        let registry = started_registry().await;

        let health = registry.health().await;
        let pipeline = &health.components[components::PIPELINE];
        assert_eq!(pipeline.status, ComponentStatus::Healthy);
        assert_eq!(pipeline.message.as_deref(), Some("model 0123456789ab"));
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_failures_degrade_and_count() {
        let registry = started_registry().await;

        registry.record_inference_failure("unknown category").await;
        registry.record_inference_failure("unknown category").await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        let pipeline = &health.components[components::PIPELINE];
        assert_eq!(pipeline.consecutive_failures, 2);
        assert!(pipeline.message.as_deref().unwrap().contains("unknown category"));

        // Degraded still serves
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_success_restores_registration_detail() {
        let registry = started_registry().await;
        registry.record_inference_failure("boom").await;
        registry.record_inference_success().await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        let pipeline = &health.components[components::PIPELINE];
        assert_eq!(pipeline.consecutive_failures, 0);
        assert_eq!(pipeline.message.as_deref(), Some("model 0123456789ab"));
    }

    #[tokio::test]
    async fn test_unhealthy_is_not_masked_by_inference_outcomes() {
        let registry = started_registry().await;
        registry
            .set_unhealthy(components::PIPELINE, "artifact missing")
            .await;
        registry.record_inference_failure("boom").await;
        registry.record_inference_success().await;

        assert_eq!(
            registry.status(components::PIPELINE).await,
            Some(ComponentStatus::Unhealthy)
        );
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("pipeline is unhealthy"));
    }

    #[test]
    fn test_worst_status_wins() {
        let mut components = BTreeMap::new();
        assert_eq!(
            HealthResponse::compute_status(&components),
            ComponentStatus::Healthy
        );

        components.insert("a".to_string(), ComponentHealth::healthy(None));
        components.insert(
            "b".to_string(),
            ComponentHealth::new(ComponentStatus::Degraded, None, 1),
        );
        assert_eq!(
            HealthResponse::compute_status(&components),
            ComponentStatus::Degraded
        );

        components.insert("c".to_string(), ComponentHealth::unhealthy("down"));
        assert_eq!(
            HealthResponse::compute_status(&components),
            ComponentStatus::Unhealthy
        );
    }
}
