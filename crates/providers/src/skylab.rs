//! Skylab Provider
//!
//! Adapter for the Skylab exterior-enhancement API: sky replacement,
//! twilight conversion, lawn repair, pool enhancement, and HDR. The API
//! works by reference - it pulls the input image from storage and returns
//! the reference of the rendered output.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use listinglens_core::{EnhancementProvider, InvokeRequest, ProviderError, ProviderResult, ToolId};

use crate::http_client::build_http_client;
use crate::types::{parse_http_error, parse_retry_after};

/// Default Skylab API endpoint
const SKYLAB_API_URL: &str = "https://api.skylab.dev/v2";

/// Configuration for the Skylab adapter.
#[derive(Debug, Clone)]
pub struct SkylabConfig {
    pub api_key: String,
    /// Override for the API base URL (tests, self-hosted gateways)
    pub base_url: Option<String>,
    pub request_timeout: std::time::Duration,
}

impl SkylabConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            request_timeout: std::time::Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Skylab enhancement provider
pub struct SkylabProvider {
    config: SkylabConfig,
    client: reqwest::Client,
}

/// Successful render response
#[derive(Debug, Deserialize)]
struct RenderResponse {
    #[serde(rename = "outputUrl")]
    output_url: String,
}

impl SkylabProvider {
    /// Create a new Skylab provider with the given configuration
    pub fn new(config: SkylabConfig) -> Self {
        let client = build_http_client(config.request_timeout);
        Self { config, client }
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(SKYLAB_API_URL)
    }

    /// Wire-level operation name for a supported tool.
    fn operation_name(tool: ToolId) -> Option<&'static str> {
        match tool {
            ToolId::SkyReplacement => Some("sky_replacement"),
            ToolId::TwilightConversion => Some("twilight"),
            ToolId::LawnRepair => Some("lawn_repair"),
            ToolId::PoolEnhancement => Some("pool_cleanup"),
            ToolId::HdrBoost => Some("hdr"),
            ToolId::VirtualStaging
            | ToolId::Declutter
            | ToolId::PerspectiveCorrection
            | ToolId::ColorBalance => None,
        }
    }

    /// Build the request body for a render call.
    fn build_request_body(&self, request: &InvokeRequest) -> ProviderResult<serde_json::Value> {
        let operation = Self::operation_name(request.tool).ok_or_else(|| {
            ProviderError::invalid_input(format!("skylab does not support {}", request.tool))
        })?;

        let mut body = serde_json::json!({
            "imageUrl": request.image_ref,
            "operation": operation,
            "strength": request.params.strength,
        });

        if let Some(preset) = &request.params.preset {
            body["preset"] = serde_json::json!(preset.wire_name());
        }
        for (key, value) in &request.params.extras {
            body[key.as_str()] = value.clone();
        }

        Ok(body)
    }
}

#[async_trait]
impl EnhancementProvider for SkylabProvider {
    fn name(&self) -> &'static str {
        "skylab"
    }

    fn supports(&self, tool: ToolId) -> bool {
        Self::operation_name(tool).is_some()
    }

    async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String> {
        let body = self.build_request_body(&request)?;
        debug!(tool = %request.tool, image_ref = %request.image_ref, "skylab render");

        let response = self
            .client
            .post(format!("{}/render", self.base_url()))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("skylab: {}", e)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok()),
            );
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, retry_after, "skylab"));
        }

        let rendered: RenderResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("skylab: {}", e)))?;

        Ok(rendered.output_url)
    }

    async fn health_check(&self) -> ProviderResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url()))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("skylab: {}", e)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, None, "skylab"));
        }
        Ok(())
    }
}
