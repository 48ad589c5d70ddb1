//! Enhancement Tools
//!
//! The closed tool set, execution-group ordering, decision priorities, and
//! listing-wide cap families. All consumers match exhaustively: adding a
//! tool here forces the planner, executor, and router to handle it.

use serde::{Deserialize, Serialize};

use crate::config::SeverityThresholds;
use crate::photo::DeficiencyKind;
use crate::presets::PresetFamily;

// ============================================================================
// ToolId
// ============================================================================

/// Closed set of enhancement tools.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    SkyReplacement,
    TwilightConversion,
    LawnRepair,
    VirtualStaging,
    Declutter,
    HdrBoost,
    PerspectiveCorrection,
    ColorBalance,
    PoolEnhancement,
}

/// All tools, for table construction and exhaustive routing checks.
pub const ALL_TOOLS: [ToolId; 9] = [
    ToolId::SkyReplacement,
    ToolId::TwilightConversion,
    ToolId::LawnRepair,
    ToolId::VirtualStaging,
    ToolId::Declutter,
    ToolId::HdrBoost,
    ToolId::PerspectiveCorrection,
    ToolId::ColorBalance,
    ToolId::PoolEnhancement,
];

impl ToolId {
    /// Which execution group the tool belongs to. Within a photo, tools run
    /// in group order (structural -> content -> polish), never by priority:
    /// structural edits invalidate assumptions that later passes depend on.
    pub fn execution_group(&self) -> ExecutionGroup {
        match self {
            ToolId::VirtualStaging | ToolId::Declutter | ToolId::PerspectiveCorrection => {
                ExecutionGroup::Structural
            }
            ToolId::SkyReplacement
            | ToolId::TwilightConversion
            | ToolId::LawnRepair
            | ToolId::PoolEnhancement => ExecutionGroup::Content,
            ToolId::HdrBoost | ToolId::ColorBalance => ExecutionGroup::Polish,
        }
    }

    /// Cap family consuming listing-wide budget, `None` for uncapped tools.
    pub fn cap_family(&self) -> Option<CapFamily> {
        match self {
            ToolId::SkyReplacement => Some(CapFamily::Sky),
            ToolId::TwilightConversion => Some(CapFamily::Twilight),
            ToolId::VirtualStaging => Some(CapFamily::Staging),
            ToolId::Declutter => Some(CapFamily::Declutter),
            ToolId::LawnRepair => Some(CapFamily::Lawn),
            ToolId::PoolEnhancement => Some(CapFamily::Pool),
            ToolId::HdrBoost | ToolId::PerspectiveCorrection | ToolId::ColorBalance => None,
        }
    }

    /// Preset family whose locked variant must be attached to every
    /// decision using this tool, `None` for preset-free tools.
    pub fn preset_family(&self) -> Option<PresetFamily> {
        match self {
            ToolId::SkyReplacement => Some(PresetFamily::Sky),
            ToolId::TwilightConversion => Some(PresetFamily::Twilight),
            ToolId::LawnRepair => Some(PresetFamily::Lawn),
            ToolId::VirtualStaging => Some(PresetFamily::Staging),
            ToolId::Declutter => Some(PresetFamily::Declutter),
            ToolId::HdrBoost => Some(PresetFamily::Hdr),
            ToolId::ColorBalance => Some(PresetFamily::ColorTemperature),
            ToolId::PerspectiveCorrection | ToolId::PoolEnhancement => None,
        }
    }

    /// The tool servicing a given deficiency. Total mapping: every
    /// deficiency kind has exactly one tool.
    pub fn for_deficiency(kind: DeficiencyKind) -> ToolId {
        match kind {
            DeficiencyKind::Sky => ToolId::SkyReplacement,
            DeficiencyKind::Lawn => ToolId::LawnRepair,
            DeficiencyKind::Lighting => ToolId::HdrBoost,
            DeficiencyKind::Clutter => ToolId::Declutter,
            DeficiencyKind::Perspective => ToolId::PerspectiveCorrection,
            DeficiencyKind::Color => ToolId::ColorBalance,
            DeficiencyKind::Pool => ToolId::PoolEnhancement,
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolId::SkyReplacement => "Sky Replacement",
            ToolId::TwilightConversion => "Twilight Conversion",
            ToolId::LawnRepair => "Lawn Repair",
            ToolId::VirtualStaging => "Virtual Staging",
            ToolId::Declutter => "Declutter",
            ToolId::HdrBoost => "HDR Boost",
            ToolId::PerspectiveCorrection => "Perspective Correction",
            ToolId::ColorBalance => "Color Balance",
            ToolId::PoolEnhancement => "Pool Enhancement",
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// ExecutionGroup
// ============================================================================

/// Ordered execution groups. Derived `Ord` gives Structural < Content <
/// Polish, which is the required per-photo run order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionGroup {
    Structural,
    Content,
    Polish,
}

impl std::fmt::Display for ExecutionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionGroup::Structural => write!(f, "structural"),
            ExecutionGroup::Content => write!(f, "content"),
            ExecutionGroup::Polish => write!(f, "polish"),
        }
    }
}

// ============================================================================
// Priority
// ============================================================================

/// Decision priority, derived from deficiency severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Weight used by the cap allocator's stable sort.
    pub fn weight(&self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Map a severity to a priority band; severities below the low cut
    /// produce no decision at all.
    pub fn from_severity(severity: u8, thresholds: &SeverityThresholds) -> Option<Priority> {
        if severity >= thresholds.critical {
            Some(Priority::Critical)
        } else if severity >= thresholds.high {
            Some(Priority::High)
        } else if severity >= thresholds.medium {
            Some(Priority::Medium)
        } else if severity >= thresholds.low {
            Some(Priority::Low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

// ============================================================================
// CapFamily
// ============================================================================

/// Families of capped tools. One family = one listing-wide counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CapFamily {
    Sky,
    Twilight,
    Staging,
    Declutter,
    Lawn,
    Pool,
}

impl std::fmt::Display for CapFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapFamily::Sky => write!(f, "sky"),
            CapFamily::Twilight => write!(f, "twilight"),
            CapFamily::Staging => write!(f, "staging"),
            CapFamily::Declutter => write!(f, "declutter"),
            CapFamily::Lawn => write!(f, "lawn"),
            CapFamily::Pool => write!(f, "pool"),
        }
    }
}
