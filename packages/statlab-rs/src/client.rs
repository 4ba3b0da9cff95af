use crate::error::{Result, StatlabError};
use crate::types::{AnalysisMethod, AnalysisParams};
use crate::upload::SelectedDataset;
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const API_BASE_ENV: &str = "STATLAB_API_URL";

/// Where the analysis service lives. Read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            timeout: None,
        }
    }

    /// Configuration from `$STATLAB_API_URL`, falling back to the local default
    pub fn from_env() -> Self {
        match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::new(base.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn normalized_base(&self) -> String {
        self.api_base.trim_end_matches('/').to_string()
    }
}

/// Everything needed for one analysis call
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub dataset: SelectedDataset,
    pub params: AnalysisParams,
}

impl AnalysisRequest {
    pub fn new(dataset: SelectedDataset, params: AnalysisParams) -> Self {
        Self { dataset, params }
    }

    pub fn method(&self) -> AnalysisMethod {
        self.params.method()
    }

    /// Path of the endpoint, relative to the API base
    pub fn endpoint_path(&self) -> String {
        format!("/api/analyze/{}", self.method().endpoint())
    }

    /// Text fields of the multipart form. Only the submitted branch is present.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match &self.params {
            AnalysisParams::Anova(p) => vec![
                ("fdr_threshold", p.fdr_threshold.to_string()),
                ("design_label", p.design_label.clone()),
                ("plot_option", p.plot_option.to_string()),
            ],
            AnalysisParams::Pca(p) => vec![
                ("num_pcs", p.num_pcs.to_string()),
                ("scaling_method", p.scaling.as_str().to_string()),
                ("design_label", p.design_label.clone()),
            ],
        }
    }
}

/// Health endpoint payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Remote analysis service
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Submit a dataset and return the raw success body.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value>;

    async fn health(&self) -> Result<HealthStatus>;
}

/// `reqwest`-backed [`AnalysisService`]
pub struct HttpAnalysisService {
    client: Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StatlabError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.normalized_base(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_form(request: &AnalysisRequest) -> Result<multipart::Form> {
        let dataset = &request.dataset;
        let file_part = multipart::Part::stream_with_length(
            dataset.contents().clone(),
            dataset.len() as u64,
        )
        .file_name(dataset.name().to_string())
        .mime_str(dataset.upload_mime().as_ref())
        .map_err(|e| StatlabError::Transport(format!("Failed to set MIME type: {}", e)))?;

        let mut form = multipart::Form::new().part("file", file_part);
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

/// Pull a human-readable message out of a failure body.
pub fn failure_message(body: &str, fallback: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Null => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        });
    detail.unwrap_or_else(|| fallback.to_string())
}

fn transport_error(e: reqwest::Error) -> StatlabError {
    if e.is_timeout() {
        StatlabError::Transport(format!("request timed out: {}", e))
    } else if e.is_connect() {
        StatlabError::Transport(format!("connection failed: {}", e))
    } else {
        StatlabError::Transport(e.to_string())
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, request.endpoint_path());
        let method = request.method();

        log::info!(
            "Submitting {} analysis: file={} ({} bytes)",
            method,
            request.dataset.name(),
            request.dataset.len()
        );
        log::debug!("POST {} fields={:?}", url, request.form_fields());

        let form = Self::build_form(request)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send {} request: {}", method, e);
                transport_error(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        log::info!("{} response status: {}", method, status);

        if !status.is_success() {
            let message = failure_message(&body, method.fallback_error());
            log::error!("{} analysis failed: {} - {}", method, status, message);
            return Err(StatlabError::Service {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| StatlabError::adapter("<body>", format!("is not valid JSON: {}", e)))
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(StatlabError::Service {
                status: status.as_u16(),
                message: failure_message(&body, "Health check failed"),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| StatlabError::adapter("<body>", format!("is not valid JSON: {}", e)))
    }
}
