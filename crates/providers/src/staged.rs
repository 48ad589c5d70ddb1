//! Staged Provider
//!
//! Adapter for the Staged inpainting API: virtual staging and declutter.
//! Unlike Skylab, this API takes image bytes inline - the adapter reads the
//! input through the image store, base64-encodes it, and persists the
//! returned render back into storage.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use listinglens_core::{
    EnhancementProvider, ImageStore, InvokeRequest, ProviderError, ProviderResult, ToolId,
};

use crate::http_client::build_http_client;
use crate::types::{parse_http_error, parse_retry_after};

/// Default Staged API endpoint
const STAGED_API_URL: &str = "https://api.staged.homes/v1";

/// Configuration for the Staged adapter.
#[derive(Debug, Clone)]
pub struct StagedConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub request_timeout: std::time::Duration,
}

impl StagedConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            request_timeout: std::time::Duration::from_secs(180),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Staged inpainting provider
pub struct StagedProvider {
    config: StagedConfig,
    client: reqwest::Client,
    store: Arc<dyn ImageStore>,
}

/// Successful inpaint response
#[derive(Debug, Deserialize)]
struct InpaintResponse {
    /// Base64-encoded rendered image
    image: String,
}

impl StagedProvider {
    /// Create a new Staged provider backed by the given image store
    pub fn new(config: StagedConfig, store: Arc<dyn ImageStore>) -> Self {
        let client = build_http_client(config.request_timeout);
        Self {
            config,
            client,
            store,
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(STAGED_API_URL)
    }

    /// Wire-level task name for a supported tool.
    fn task_name(tool: ToolId) -> Option<&'static str> {
        match tool {
            ToolId::VirtualStaging => Some("stage"),
            ToolId::Declutter => Some("declutter"),
            ToolId::SkyReplacement
            | ToolId::TwilightConversion
            | ToolId::LawnRepair
            | ToolId::HdrBoost
            | ToolId::PerspectiveCorrection
            | ToolId::ColorBalance
            | ToolId::PoolEnhancement => None,
        }
    }
}

#[async_trait]
impl EnhancementProvider for StagedProvider {
    fn name(&self) -> &'static str {
        "staged"
    }

    fn supports(&self, tool: ToolId) -> bool {
        Self::task_name(tool).is_some()
    }

    async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String> {
        let task = Self::task_name(request.tool).ok_or_else(|| {
            ProviderError::invalid_input(format!("staged does not support {}", request.tool))
        })?;

        let input = self
            .store
            .read(&request.image_ref)
            .await
            .map_err(|e| ProviderError::unavailable(format!("staged: storage read: {}", e)))?;

        debug!(tool = %request.tool, bytes = input.len(), "staged inpaint");

        let mut body = serde_json::json!({
            "task": task,
            "image": BASE64.encode(&input),
            "strength": request.params.strength,
        });
        if let Some(preset) = &request.params.preset {
            body["style"] = serde_json::json!(preset.wire_name());
        }

        let response = self
            .client
            .post(format!("{}/inpaint", self.base_url()))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("staged: {}", e)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok()),
            );
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, retry_after, "staged"));
        }

        let rendered: InpaintResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("staged: {}", e)))?;

        let output = BASE64
            .decode(rendered.image.as_bytes())
            .map_err(|e| ProviderError::parse(format!("staged: invalid base64: {}", e)))?;

        self.store
            .write(&output)
            .await
            .map_err(|e| ProviderError::unavailable(format!("staged: storage write: {}", e)))
    }

    async fn health_check(&self) -> ProviderResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url()))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("staged: {}", e)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, None, "staged"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryImageStore;
    use listinglens_core::ToolParams;

    #[test]
    fn test_supported_tools() {
        let store = Arc::new(MemoryImageStore::new());
        let p = StagedProvider::new(StagedConfig::new("k"), store);
        assert!(p.supports(ToolId::VirtualStaging));
        assert!(p.supports(ToolId::Declutter));
        assert!(!p.supports(ToolId::SkyReplacement));
        assert!(!p.supports(ToolId::HdrBoost));
    }

    #[tokio::test]
    async fn test_unsupported_tool_rejected_before_network() {
        let store = Arc::new(MemoryImageStore::new());
        let p = StagedProvider::new(StagedConfig::new("k"), store);
        let request = InvokeRequest {
            tool: ToolId::SkyReplacement,
            image_ref: "mem://0".to_string(),
            params: ToolParams::new(None, 1.0),
        };
        assert!(matches!(
            p.invoke(request).await,
            Err(ProviderError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_input_is_unavailable() {
        let store = Arc::new(MemoryImageStore::new());
        let p = StagedProvider::new(StagedConfig::new("k"), store);
        let request = InvokeRequest {
            tool: ToolId::Declutter,
            image_ref: "mem://missing".to_string(),
            params: ToolParams::new(None, 0.5),
        };
        assert!(matches!(
            p.invoke(request).await,
            Err(ProviderError::Unavailable { .. })
        ));
    }
}
