//! Quality Models
//!
//! Flags from the consistency pass and issues from the validator. Both are
//! informational records feeding the final status decision, never retry
//! triggers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use listinglens_core::{PresetFamily, ToolId};

// ============================================================================
// Consistency Flags
// ============================================================================

/// What a consistency flag is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyFlagKind {
    /// A photo was instructed with a preset other than the locked variant
    PresetMismatch {
        family: PresetFamily,
        tool: ToolId,
    },
    /// An optional refinement pass fell back to its base pass
    RefinementFellBack { label: String },
}

/// One divergence between a finished photo and the listing's locked look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyFlag {
    pub photo_id: String,
    pub kind: ConsistencyFlagKind,
    pub detail: String,
}

impl ConsistencyFlag {
    /// Refinement fallbacks are informational; mismatches are not.
    pub fn is_informational(&self) -> bool {
        matches!(self.kind, ConsistencyFlagKind::RefinementFellBack { .. })
    }
}

// ============================================================================
// Validation Issues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Minor,
    Major,
}

/// Closed set of validator findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The photo's processing failed outright
    PhotoFailed,
    /// Processing reported success but produced no output reference
    MissingOutput,
    /// Consistency pass found a preset divergence
    PresetDrift,
    /// An optional refinement pass was dropped
    RefinementFallback,
    /// A planned decision was never serviced (cap exhaustion)
    UnservicedDecision,
}

/// One validator finding against one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub photo_id: String,
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    pub detail: String,
}

/// The validator's aggregate verdict for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Listing confidence after penalties, 0-100
    pub overall_score: u8,
    pub checked_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn major_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Major)
    }
}
