//! Port Traits
//!
//! The boundaries the engine depends on: enhancement providers, durable
//! image storage, the analysis backend, and the one-way progress sink.
//! Adapter implementations live in the providers crate; tests supply mocks.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::enhancement::ToolId;
use crate::error::{CoreResult, ProviderResult};
use crate::photo::{PhotoAnalysis, PhotoRef};
use crate::presets::PresetVariant;
use crate::progress::ProgressEvent;

// ============================================================================
// Enhancement Provider
// ============================================================================

/// Parameters for one provider invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolParams {
    /// Locked preset variant, when the tool has a preset family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetVariant>,
    /// Transformation strength, 0.0-1.0. Refinement passes use low values
    /// so they nudge rather than re-render.
    pub strength: f32,
    /// Backend-specific extras, opaque to the engine
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl ToolParams {
    pub fn new(preset: Option<PresetVariant>, strength: f32) -> Self {
        Self {
            preset,
            strength,
            extras: BTreeMap::new(),
        }
    }
}

/// One request to an enhancement backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub tool: ToolId,
    /// Opaque storage reference of the input image
    pub image_ref: String,
    pub params: ToolParams,
}

/// Capability boundary of an enhancement backend.
///
/// Adapters translate wire-level request/response shapes; the engine only
/// ever sees `invoke(tool, imageRef, params) -> imageRef` plus the typed
/// error taxonomy.
#[async_trait]
pub trait EnhancementProvider: Send + Sync {
    /// Provider name for routing and logging.
    fn name(&self) -> &'static str;

    /// Whether this backend can execute the given tool.
    fn supports(&self, tool: ToolId) -> bool;

    /// Run one enhancement. Returns the storage reference of the output
    /// image on success.
    async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String>;

    /// Check that the backend is reachable and credentials are valid.
    async fn health_check(&self) -> ProviderResult<()>;
}

// ============================================================================
// Image Store
// ============================================================================

/// Durable storage for image bytes, addressed by opaque references.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Read the bytes behind a reference.
    async fn read(&self, storage_ref: &str) -> CoreResult<Vec<u8>>;

    /// Persist bytes, returning a new opaque reference.
    async fn write(&self, bytes: &[u8]) -> CoreResult<String>;
}

// ============================================================================
// Analyzer Backend
// ============================================================================

/// Vision backend turning one raw photo into a structured analysis.
///
/// Failures are photo-scoped; the engine converts them into degraded
/// analyses rather than aborting the listing.
#[async_trait]
pub trait PhotoAnalyzerBackend: Send + Sync {
    async fn analyze(&self, photo: &PhotoRef) -> CoreResult<PhotoAnalysis>;
}

// ============================================================================
// Progress Sink
// ============================================================================

/// One-way progress notification. Events are never consumed back into
/// decisions.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{PresetVariant, SkyPreset};

    #[test]
    fn test_tool_params_serialization_skips_empty_extras() {
        let params = ToolParams::new(Some(PresetVariant::Sky(SkyPreset::ClearBlue)), 0.8);
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("extras").is_none());
        assert_eq!(json["strength"], 0.8);
    }

    #[test]
    fn test_invoke_request_round_trip() {
        let req = InvokeRequest {
            tool: ToolId::SkyReplacement,
            image_ref: "s3://bucket/a.jpg".to_string(),
            params: ToolParams::new(None, 1.0),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: InvokeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_null_sink_accepts_events() {
        use crate::progress::PipelinePhase;
        let sink = NullProgressSink;
        sink.emit(&ProgressEvent::new(PipelinePhase::Analyzing, 0, "start"));
    }
}
