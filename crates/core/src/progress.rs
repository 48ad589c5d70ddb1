//! Progress Reporting
//!
//! Ordered progress events plus an equivalent pollable snapshot. Both views
//! share phase semantics, and `progress` is monotonically non-decreasing
//! within a run - the tracker clamps regressions.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::ports::ProgressSink;

// ============================================================================
// Phases & Events
// ============================================================================

/// Pipeline phase, mapping onto the orchestrator's stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Analyzing,
    Strategizing,
    Processing,
    Validating,
    Completed,
    NeedsReview,
    Failed,
}

impl PipelinePhase {
    /// Whether this phase ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelinePhase::Completed | PipelinePhase::NeedsReview | PipelinePhase::Failed
        )
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelinePhase::Analyzing => "analyzing",
            PipelinePhase::Strategizing => "strategizing",
            PipelinePhase::Processing => "processing",
            PipelinePhase::Validating => "validating",
            PipelinePhase::Completed => "completed",
            PipelinePhase::NeedsReview => "needs_review",
            PipelinePhase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Per-photo progress within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoProgress {
    pub current: usize,
    pub total: usize,
}

/// One progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub phase: PipelinePhase,
    /// Overall run progress, 0-100
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_progress: Option<PhotoProgress>,
}

impl ProgressEvent {
    pub fn new(phase: PipelinePhase, progress: u8, message: impl Into<String>) -> Self {
        Self {
            phase,
            progress,
            message: message.into(),
            photo_progress: None,
        }
    }

    pub fn with_photos(mut self, current: usize, total: usize) -> Self {
        self.photo_progress = Some(PhotoProgress { current, total });
        self
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Fans events out to a sink while maintaining a pollable snapshot.
///
/// The snapshot and the event stream agree by construction: every emitted
/// event becomes the new snapshot, with `progress` clamped so the reported
/// value never decreases within a run.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    snapshot: Mutex<ProgressEvent>,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            snapshot: Mutex::new(ProgressEvent::new(PipelinePhase::Analyzing, 0, "queued")),
        }
    }

    /// Emit an event, clamping progress to be non-decreasing.
    pub fn emit(&self, mut event: ProgressEvent) {
        let mut snapshot = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if event.progress < snapshot.progress {
            event.progress = snapshot.progress;
        }
        *snapshot = event.clone();
        drop(snapshot);
        self.sink.emit(&event);
    }

    /// Current snapshot for polling consumers.
    pub fn snapshot(&self) -> ProgressEvent {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Reset to the initial state for a fresh run.
    pub fn reset(&self) {
        let mut snapshot = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *snapshot = ProgressEvent::new(PipelinePhase::Analyzing, 0, "queued");
    }
}
