//! API client for communicating with the price server

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// API client for the price server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_accepting(path, &[]).await
    }

    /// GET that also decodes the body of the listed error statuses
    async fn get_accepting<T: DeserializeOwned>(
        &self,
        path: &str,
        accepted: &[StatusCode],
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        read_body(response, accepted).await
    }

    /// POST a JSON body, decoding the body of the listed error statuses
    async fn post_accepting<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        accepted: &[StatusCode],
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        read_body(response, accepted).await
    }

    /// Request an estimate. Rejections (400, 422) and pipeline failures (500)
    /// come back as a response with `ok == false`.
    pub async fn estimate(&self, request: &EstimateRequest) -> Result<EstimateResponse> {
        self.post_accepting(
            "api/v1/estimate",
            request,
            &[
                StatusCode::BAD_REQUEST,
                StatusCode::UNPROCESSABLE_ENTITY,
                StatusCode::INTERNAL_SERVER_ERROR,
            ],
        )
        .await
    }

    pub async fn options(&self) -> Result<OptionsResponse> {
        self.get("api/v1/options").await
    }

    /// Liveness report, including the unhealthy (503) case
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_accepting("healthz", &[StatusCode::SERVICE_UNAVAILABLE])
            .await
    }

    pub async fn readiness(&self) -> Result<ReadinessResponse> {
        self.get_accepting("readyz", &[StatusCode::SERVICE_UNAVAILABLE])
            .await
    }
}

async fn read_body<T: DeserializeOwned>(response: Response, accepted: &[StatusCode]) -> Result<T> {
    let status = response.status();
    if !status.is_success() && !accepted.contains(&status) {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("API error ({}): {}", status, body);
    }

    response.json().await.context("Failed to parse response")
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub company: String,
    pub type_name: String,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
    pub weight_kg: f64,
    pub touchscreen: bool,
    pub ips_display: bool,
    pub screen_size_inches: f64,
    pub resolution: String,
    pub cpu_brand: String,
    #[serde(rename = "hddGB")]
    pub hdd_gb: u32,
    #[serde(rename = "ssdGB")]
    pub ssd_gb: u32,
    pub gpu_brand: String,
    pub operating_system: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppi_was_defaulted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub companies: Vec<String>,
    pub type_names: Vec<String>,
    pub cpu_brands: Vec<String>,
    pub gpu_brands: Vec<String>,
    pub operating_systems: Vec<String>,
    pub ram_gb: Vec<u32>,
    pub hdd_gb: Vec<u32>,
    pub ssd_gb: Vec<u32>,
    pub resolutions: Vec<String>,
    pub weight_kg: Range,
    pub screen_size_inches: Range,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
