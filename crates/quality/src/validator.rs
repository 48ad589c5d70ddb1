//! Quality Validator
//!
//! Scores the run's output against structural-integrity and
//! enhancement-quality criteria. The score starts from the planner's
//! confidence and only moves down; penalties are per finding, with hero
//! failures weighted heaviest.

use chrono::Utc;
use tracing::info;

use listinglens_core::{ListingStrategy, PhotoProcessingResult, ValidationConfig};

use crate::models::{
    ConsistencyFlag, ConsistencyFlagKind, IssueKind, IssueSeverity, ValidationIssue,
    ValidationReport,
};

const PENALTY_PHOTO_FAILED: u8 = 15;
const PENALTY_HERO_FAILED: u8 = 25;
const PENALTY_MISSING_OUTPUT: u8 = 10;
const PENALTY_PRESET_DRIFT: u8 = 8;
const PENALTY_REFINEMENT_FALLBACK: u8 = 3;
const PENALTY_UNSERVICED: u8 = 2;

/// Validate one run's results against its strategy and consistency flags.
pub fn validate(
    results: &[PhotoProcessingResult],
    strategy: &ListingStrategy,
    flags: &[ConsistencyFlag],
    _config: &ValidationConfig,
) -> ValidationReport {
    let mut issues = Vec::new();
    let mut score = strategy.confidence_score;

    for result in results {
        if !result.success {
            let is_hero = result.photo_id == strategy.hero_photo_id;
            score = score.saturating_sub(if is_hero {
                PENALTY_HERO_FAILED
            } else {
                PENALTY_PHOTO_FAILED
            });
            issues.push(ValidationIssue {
                photo_id: result.photo_id.clone(),
                severity: IssueSeverity::Major,
                kind: IssueKind::PhotoFailed,
                detail: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "processing failed".to_string()),
            });
        } else if result.final_ref.is_none() {
            score = score.saturating_sub(PENALTY_MISSING_OUTPUT);
            issues.push(ValidationIssue {
                photo_id: result.photo_id.clone(),
                severity: IssueSeverity::Major,
                kind: IssueKind::MissingOutput,
                detail: "success reported without an output reference".to_string(),
            });
        }
    }

    for flag in flags {
        let (kind, severity, penalty) = match &flag.kind {
            ConsistencyFlagKind::PresetMismatch { .. } => {
                (IssueKind::PresetDrift, IssueSeverity::Major, PENALTY_PRESET_DRIFT)
            }
            ConsistencyFlagKind::RefinementFellBack { .. } => (
                IssueKind::RefinementFallback,
                IssueSeverity::Minor,
                PENALTY_REFINEMENT_FALLBACK,
            ),
        };
        score = score.saturating_sub(penalty);
        issues.push(ValidationIssue {
            photo_id: flag.photo_id.clone(),
            severity,
            kind,
            detail: flag.detail.clone(),
        });
    }

    for skipped in &strategy.skipped {
        score = score.saturating_sub(PENALTY_UNSERVICED);
        issues.push(ValidationIssue {
            photo_id: skipped.photo_id.clone(),
            severity: IssueSeverity::Minor,
            kind: IssueKind::UnservicedDecision,
            detail: skipped.reason.clone(),
        });
    }

    info!(
        listing_id = %strategy.listing_id,
        issues = issues.len(),
        score,
        "validation complete"
    );

    ValidationReport {
        issues,
        overall_score: score,
        checked_at: Utc::now(),
    }
}
