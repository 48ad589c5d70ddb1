//! Execution Results
//!
//! Per-photo processing outcomes, the listing status gate, and the final
//! `ListingResult` returned to the caller.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::enhancement::ToolId;
use crate::presets::PresetVariant;

// ============================================================================
// Per-photo Results
// ============================================================================

/// Record of one tool applied to a photo, with the preset it was
/// instructed with. The consistency pass compares these against the
/// listing's locked presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTool {
    pub tool: ToolId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetVariant>,
}

/// Execution outcome for one photo. Created when the executor starts the
/// photo, finalized when all of its decisions have run or one fails fatally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoProcessingResult {
    pub photo_id: String,
    pub success: bool,
    /// Storage reference of the final image, when processing succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_ref: Option<String>,
    /// Tools that were applied, in execution order
    pub applied: Vec<AppliedTool>,
    /// Labels of optional refinement steps that fell back to their base pass
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,
    /// Estimated spend for this photo, in cents
    pub cost_cents: u32,
    pub duration_ms: u64,
    /// Unix millis when the executor started this photo
    pub started_at: i64,
    /// Error detail when processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhotoProcessingResult {
    /// Successful result.
    pub fn succeeded(
        photo_id: impl Into<String>,
        final_ref: impl Into<String>,
        applied: Vec<AppliedTool>,
    ) -> Self {
        Self {
            photo_id: photo_id.into(),
            success: true,
            final_ref: Some(final_ref.into()),
            applied,
            fallbacks: Vec::new(),
            cost_cents: 0,
            duration_ms: 0,
            started_at: 0,
            error: None,
        }
    }

    /// Failed result with the triggering error.
    pub fn failed(photo_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            photo_id: photo_id.into(),
            success: false,
            final_ref: None,
            applied: Vec::new(),
            fallbacks: Vec::new(),
            cost_cents: 0,
            duration_ms: 0,
            started_at: 0,
            error: Some(error.into()),
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_cost(mut self, cost_cents: u32) -> Self {
        self.cost_cents = cost_cents;
        self
    }

    pub fn with_timing(mut self, started_at: i64, duration_ms: u64) -> Self {
        self.started_at = started_at;
        self.duration_ms = duration_ms;
        self
    }
}

// ============================================================================
// Listing Status & Result
// ============================================================================

/// Terminal status of a listing run. There is no automatic re-run loop;
/// `NeedsReview` and `Failed` are surfaced to the caller, which may invoke
/// the whole pipeline again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Prepared,
    NeedsReview,
    Failed,
}

impl ListingStatus {
    /// Map a confidence score to a status. Scores at or above the review
    /// threshold are `Prepared` (with lower trust below the prepared
    /// threshold); below it, `NeedsReview`. `Failed` is only produced by
    /// executor-level fatal errors, never by this mapping.
    pub fn from_confidence(score: u8, config: &ValidationConfig) -> Self {
        if score >= config.review_threshold {
            ListingStatus::Prepared
        } else {
            ListingStatus::NeedsReview
        }
    }

    /// Whether a prepared listing at this score is fully trusted.
    pub fn is_high_trust(score: u8, config: &ValidationConfig) -> bool {
        score >= config.prepared_threshold
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Prepared => write!(f, "prepared"),
            ListingStatus::NeedsReview => write!(f, "needs_review"),
            ListingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Final outcome of preparing one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResult {
    pub listing_id: String,
    /// Unique identifier of this run
    pub run_id: String,
    pub status: ListingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_photo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilight_photo_id: Option<String>,
    pub per_photo: Vec<PhotoProcessingResult>,
    pub confidence_score: u8,
    pub total_cost_cents: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ListingResult {
    /// A failed result carrying the fatal error, produced before (or
    /// instead of) execution.
    pub fn failed(
        listing_id: impl Into<String>,
        run_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            run_id: run_id.into(),
            status: ListingStatus::Failed,
            hero_photo_id: None,
            twilight_photo_id: None,
            per_photo: Vec::new(),
            confidence_score: 0,
            total_cost_cents: 0,
            errors: vec![error.into()],
        }
    }
}
