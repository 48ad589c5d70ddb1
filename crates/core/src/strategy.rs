//! Listing Strategy Model
//!
//! Decisions, roles, listing-wide caps, and the complete `ListingStrategy`
//! plan. The strategy is built once per run and consumed read-only by the
//! executor; execution results are tracked separately, keyed by photo id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enhancement::{CapFamily, Priority, ToolId};
use crate::presets::{LockedPresets, PresetVariant};

// ============================================================================
// Roles & Decisions
// ============================================================================

/// Role of a photo within its listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoRole {
    /// Candidate primary listing image; serviced first under cap pressure
    Hero,
    /// Regular gallery photo
    Supporting,
    /// Documentation shot (garage, utility room); minimal enhancement
    Utility,
}

impl PhotoRole {
    /// Rank used to advantage heroes in cap allocation (lower wins ties).
    pub fn rank(&self) -> u8 {
        match self {
            PhotoRole::Hero => 0,
            PhotoRole::Supporting => 1,
            PhotoRole::Utility => 2,
        }
    }
}

impl std::fmt::Display for PhotoRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoRole::Hero => write!(f, "hero"),
            PhotoRole::Supporting => write!(f, "supporting"),
            PhotoRole::Utility => write!(f, "utility"),
        }
    }
}

/// One tool applied to one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementDecision {
    pub tool: ToolId,
    /// Locked variant for the tool's preset family, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetVariant>,
    /// Why the planner chose this tool
    pub reason: String,
    pub priority: Priority,
}

/// A candidate decision the cap allocator dropped, with the reason.
///
/// Cap exhaustion is a deliberate planning outcome, not an error; dropped
/// candidates are recorded so callers can surface them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDecision {
    pub photo_id: String,
    pub tool: ToolId,
    pub reason: String,
}

/// The complete plan for one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoStrategy {
    pub photo_id: String,
    pub role: PhotoRole,
    /// Accepted decisions in execution order (structural -> content -> polish)
    pub decisions: Vec<EnhancementDecision>,
    /// Planner confidence for this photo, 0-100
    pub confidence: u8,
}

// ============================================================================
// Caps
// ============================================================================

/// Listing-wide upper bounds per capped tool family.
///
/// A pure function of listing size; recomputing for the same listing always
/// yields the same caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCaps {
    pub sky: u32,
    pub twilight: u32,
    pub staging: u32,
    pub declutter: u32,
    pub lawn: u32,
    pub pool: u32,
}

impl ListingCaps {
    /// Compute caps for a listing of `total_photos`.
    pub fn for_listing(total_photos: usize) -> Self {
        let n = total_photos as f32;
        let share = |pct: f32, max: u32| -> u32 { ((n * pct).ceil() as u32).min(max) };
        Self {
            sky: share(0.15, 3),
            twilight: 1,
            staging: share(0.10, 2),
            declutter: share(0.20, 4),
            lawn: share(0.10, 2),
            pool: 1,
        }
    }

    /// Cap for a family.
    pub fn cap(&self, family: CapFamily) -> u32 {
        match family {
            CapFamily::Sky => self.sky,
            CapFamily::Twilight => self.twilight,
            CapFamily::Staging => self.staging,
            CapFamily::Declutter => self.declutter,
            CapFamily::Lawn => self.lawn,
            CapFamily::Pool => self.pool,
        }
    }
}

/// Per-run usage counters against `ListingCaps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapsUsage(BTreeMap<CapFamily, u32>);

impl CapsUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units consumed so far for a family.
    pub fn used(&self, family: CapFamily) -> u32 {
        self.0.get(&family).copied().unwrap_or(0)
    }

    /// Consume one unit if the family is still under its cap. Returns
    /// whether the unit was granted; once a cap is reached every further
    /// request is refused regardless of priority.
    pub fn try_consume(&mut self, family: CapFamily, caps: &ListingCaps) -> bool {
        let used = self.used(family);
        if used < caps.cap(family) {
            self.0.insert(family, used + 1);
            true
        } else {
            false
        }
    }
}

// ============================================================================
// ListingStrategy
// ============================================================================

/// The complete plan for one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStrategy {
    pub listing_id: String,
    /// Per-photo strategies, in hero-score order
    pub photos: Vec<PhotoStrategy>,
    pub locked_presets: LockedPresets,
    pub caps: ListingCaps,
    pub caps_usage: CapsUsage,
    /// Candidates dropped by cap allocation, with reasons
    pub skipped: Vec<SkippedDecision>,
    /// The single photo chosen to lead the listing
    pub hero_photo_id: String,
    /// The photo selected for twilight conversion, when one was planned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilight_photo_id: Option<String>,
    /// Aggregate planner confidence, 0-100
    pub confidence_score: u8,
}

impl ListingStrategy {
    /// Look up one photo's strategy.
    pub fn photo(&self, photo_id: &str) -> Option<&PhotoStrategy> {
        self.photos.iter().find(|p| p.photo_id == photo_id)
    }

    /// Count of photos assigned a given tool.
    pub fn assignments(&self, tool: ToolId) -> usize {
        self.photos
            .iter()
            .filter(|p| p.decisions.iter().any(|d| d.tool == tool))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_for_twenty_photos() {
        let caps = ListingCaps::for_listing(20);
        // min(3, ceil(20 * 0.15)) = 3
        assert_eq!(caps.sky, 3);
        assert_eq!(caps.twilight, 1);
        assert_eq!(caps.staging, 2);
        assert_eq!(caps.declutter, 4);
    }

    #[test]
    fn test_caps_for_small_listing() {
        let caps = ListingCaps::for_listing(4);
        // ceil(4 * 0.15) = 1
        assert_eq!(caps.sky, 1);
        assert_eq!(caps.staging, 1);
        assert_eq!(caps.declutter, 1);
    }

    #[test]
    fn test_caps_are_deterministic() {
        assert_eq!(ListingCaps::for_listing(13), ListingCaps::for_listing(13));
    }

    #[test]
    fn test_usage_respects_cap() {
        let caps = ListingCaps::for_listing(20);
        let mut usage = CapsUsage::new();
        assert!(usage.try_consume(CapFamily::Sky, &caps));
        assert!(usage.try_consume(CapFamily::Sky, &caps));
        assert!(usage.try_consume(CapFamily::Sky, &caps));
        // Cap of 3 reached; fourth request refused
        assert!(!usage.try_consume(CapFamily::Sky, &caps));
        assert_eq!(usage.used(CapFamily::Sky), 3);
    }

    #[test]
    fn test_twilight_cap_is_one() {
        let caps = ListingCaps::for_listing(50);
        let mut usage = CapsUsage::new();
        assert!(usage.try_consume(CapFamily::Twilight, &caps));
        assert!(!usage.try_consume(CapFamily::Twilight, &caps));
    }

    #[test]
    fn test_role_rank_advantages_heroes() {
        assert!(PhotoRole::Hero.rank() < PhotoRole::Supporting.rank());
        assert!(PhotoRole::Supporting.rank() < PhotoRole::Utility.rank());
    }
}
