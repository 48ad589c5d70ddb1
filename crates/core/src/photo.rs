//! Photo Domain Model
//!
//! Scene classification, quality scores, deficiency maps, and the immutable
//! `PhotoAnalysis` record produced once per input photo.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Scene Classification
// ============================================================================

/// Top-level scene type of a listing photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoType {
    /// Ground-level exterior shot
    Exterior,
    /// Interior room shot
    Interior,
    /// Aerial/drone shot
    Drone,
    /// Close-up detail shot (fixtures, finishes)
    Detail,
}

impl PhotoType {
    /// Whether this photo shows the outside of the property.
    ///
    /// Drone shots count: they carry sky and lawn the same way ground-level
    /// exteriors do, so they participate in sky/lawn preset derivation.
    pub fn is_exterior(&self) -> bool {
        matches!(self, PhotoType::Exterior | PhotoType::Drone)
    }

    /// Whether this photo shows a room interior.
    pub fn is_interior(&self) -> bool {
        matches!(self, PhotoType::Interior)
    }
}

impl std::fmt::Display for PhotoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoType::Exterior => write!(f, "exterior"),
            PhotoType::Interior => write!(f, "interior"),
            PhotoType::Drone => write!(f, "drone"),
            PhotoType::Detail => write!(f, "detail"),
        }
    }
}

/// Finer-grained scene classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSubType {
    Kitchen,
    Bathroom,
    Bedroom,
    LivingRoom,
    DiningRoom,
    FrontElevation,
    Backyard,
    Pool,
    Garage,
    Other,
}

// ============================================================================
// Quality Scores
// ============================================================================

/// Per-photo quality scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoScores {
    pub composition: u8,
    pub lighting: u8,
    pub sharpness: u8,
}

impl PhotoScores {
    pub fn new(composition: u8, lighting: u8, sharpness: u8) -> Self {
        Self {
            composition,
            lighting,
            sharpness,
        }
    }

    /// Mean of the three component scores.
    pub fn overall(&self) -> u8 {
        ((self.composition as u16 + self.lighting as u16 + self.sharpness as u16) / 3) as u8
    }
}

impl Default for PhotoScores {
    fn default() -> Self {
        Self::new(50, 50, 50)
    }
}

// ============================================================================
// Deficiencies
// ============================================================================

/// Closed set of detectable photo deficiencies.
///
/// Each kind maps to exactly one enhancement tool; see
/// `ToolId::for_deficiency`. Adding a variant here forces every consuming
/// match (planner, executor routing, presets) to be updated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DeficiencyKind {
    /// Blown-out, gray, or otherwise unappealing sky
    Sky,
    /// Patchy or browned lawn
    Lawn,
    /// Underexposure, blown highlights, flat dynamic range
    Lighting,
    /// Visible clutter (personal items, cables, bins)
    Clutter,
    /// Converging verticals / keystone distortion
    Perspective,
    /// Color cast or white-balance drift
    Color,
    /// Murky or green pool water
    Pool,
}

impl std::fmt::Display for DeficiencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeficiencyKind::Sky => "sky",
            DeficiencyKind::Lawn => "lawn",
            DeficiencyKind::Lighting => "lighting",
            DeficiencyKind::Clutter => "clutter",
            DeficiencyKind::Perspective => "perspective",
            DeficiencyKind::Color => "color",
            DeficiencyKind::Pool => "pool",
        };
        write!(f, "{}", s)
    }
}

/// One detected deficiency: severity 0-100 plus optional areal coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deficiency {
    /// How bad the defect is, 0-100
    pub severity: u8,
    /// Fraction of the frame affected (0.0-1.0), when the detector knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f32>,
}

impl Deficiency {
    pub fn new(severity: u8) -> Self {
        Self {
            severity,
            coverage: None,
        }
    }

    pub fn with_coverage(mut self, coverage: f32) -> Self {
        self.coverage = Some(coverage);
        self
    }
}

/// Per-photo deficiency map.
///
/// Backed by a `BTreeMap` so iteration order is deterministic - the strategy
/// builder's output must be bit-identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeficiencyMap(BTreeMap<DeficiencyKind, Deficiency>);

impl DeficiencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: DeficiencyKind, deficiency: Deficiency) {
        self.0.insert(kind, deficiency);
    }

    /// Builder-style insert.
    pub fn with(mut self, kind: DeficiencyKind, severity: u8) -> Self {
        self.insert(kind, Deficiency::new(severity));
        self
    }

    pub fn get(&self, kind: DeficiencyKind) -> Option<&Deficiency> {
        self.0.get(&kind)
    }

    /// Severity for a kind, 0 when absent.
    pub fn severity(&self, kind: DeficiencyKind) -> u8 {
        self.0.get(&kind).map(|d| d.severity).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeficiencyKind, &Deficiency)> {
        self.0.iter()
    }

    /// Deficiencies at or above the given severity, in deterministic order.
    pub fn significant(&self, min_severity: u8) -> impl Iterator<Item = (DeficiencyKind, &Deficiency)> {
        self.0
            .iter()
            .filter(move |(_, d)| d.severity >= min_severity)
            .map(|(k, d)| (*k, d))
    }
}

// ============================================================================
// Features & Analysis
// ============================================================================

/// Boolean scene features detected per photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFeatures {
    pub has_sky: bool,
    pub has_lawn: bool,
    pub has_pool: bool,
    pub has_fireplace: bool,
    pub has_windows: bool,
    /// True for unfurnished rooms (virtual staging candidates)
    pub is_empty: bool,
}

/// Reference to a stored input photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    /// Stable photo identifier within the listing
    pub id: String,
    /// Opaque storage reference (URL or key)
    pub storage_ref: String,
}

impl PhotoRef {
    pub fn new(id: impl Into<String>, storage_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            storage_ref: storage_ref.into(),
        }
    }
}

/// Structured analysis of one raw photo.
///
/// Produced once by the analyzer, immutable afterwards. A photo whose
/// analysis failed is carried as `PhotoAnalysis::degraded` (confidence 0,
/// no deficiencies) so the planner can still assign it a minimal tool set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAnalysis {
    pub photo_id: String,
    pub photo_type: PhotoType,
    pub sub_type: PhotoSubType,
    pub scores: PhotoScores,
    pub deficiencies: DeficiencyMap,
    pub features: PhotoFeatures,
    /// Suitability as the primary listing image, 0-100
    pub hero_score: u8,
    /// How much the analyzer trusts this record, 0-100
    pub analysis_confidence: u8,
}

impl PhotoAnalysis {
    /// Placeholder analysis for a photo that could not be classified.
    pub fn degraded(photo_id: impl Into<String>) -> Self {
        Self {
            photo_id: photo_id.into(),
            photo_type: PhotoType::Detail,
            sub_type: PhotoSubType::Other,
            scores: PhotoScores::default(),
            deficiencies: DeficiencyMap::new(),
            features: PhotoFeatures::default(),
            hero_score: 0,
            analysis_confidence: 0,
        }
    }

    /// Whether this record came from the degraded-analysis path.
    pub fn is_degraded(&self) -> bool {
        self.analysis_confidence == 0
    }
}
