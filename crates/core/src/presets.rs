//! Locked Presets
//!
//! One chosen variant per enhancement family, locked per listing before any
//! photo strategy is built. Every photo receiving a family is instructed
//! with the same locked variant - that is what makes a listing look like one
//! coherent shoot instead of twenty independent edits.

use serde::{Deserialize, Serialize};

// ============================================================================
// Per-family Variants
// ============================================================================

/// Sky replacement styles, least to most dramatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyPreset {
    ClearBlue,
    SoftSunset,
    DramaticClouds,
}

/// Twilight conversion tones. Blue-hour is the universally safe default;
/// golden-hour is reserved for photogenic listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightPreset {
    BlueHour,
    GoldenHour,
}

/// Lawn repair intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawnPreset {
    Natural,
    Lush,
}

/// HDR strength band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HdrStrength {
    Subtle,
    Balanced,
    Strong,
}

/// Virtual staging furniture style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingStyle {
    Modern,
    Scandinavian,
    Traditional,
}

/// Target color temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTemperature {
    Neutral,
    Warm,
    Cool,
}

/// Declutter aggressiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclutterLevel {
    Light,
    Moderate,
    Aggressive,
}

// ============================================================================
// Families & Variant Union
// ============================================================================

/// The enhancement families subject to preset locking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PresetFamily {
    Sky,
    Twilight,
    Lawn,
    Hdr,
    Staging,
    ColorTemperature,
    Declutter,
}

impl std::fmt::Display for PresetFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PresetFamily::Sky => "sky",
            PresetFamily::Twilight => "twilight",
            PresetFamily::Lawn => "lawn",
            PresetFamily::Hdr => "hdr",
            PresetFamily::Staging => "staging",
            PresetFamily::ColorTemperature => "color_temperature",
            PresetFamily::Declutter => "declutter",
        };
        write!(f, "{}", s)
    }
}

/// A chosen variant from any family. Carried on decisions and on applied
/// tool records so the consistency pass can compare them for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", content = "variant", rename_all = "snake_case")]
pub enum PresetVariant {
    Sky(SkyPreset),
    Twilight(TwilightPreset),
    Lawn(LawnPreset),
    Hdr(HdrStrength),
    Staging(StagingStyle),
    ColorTemperature(ColorTemperature),
    Declutter(DeclutterLevel),
}

impl PresetVariant {
    /// The family this variant belongs to.
    pub fn family(&self) -> PresetFamily {
        match self {
            PresetVariant::Sky(_) => PresetFamily::Sky,
            PresetVariant::Twilight(_) => PresetFamily::Twilight,
            PresetVariant::Lawn(_) => PresetFamily::Lawn,
            PresetVariant::Hdr(_) => PresetFamily::Hdr,
            PresetVariant::Staging(_) => PresetFamily::Staging,
            PresetVariant::ColorTemperature(_) => PresetFamily::ColorTemperature,
            PresetVariant::Declutter(_) => PresetFamily::Declutter,
        }
    }

    /// Wire name used by provider adapters.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PresetVariant::Sky(SkyPreset::ClearBlue) => "clear-blue",
            PresetVariant::Sky(SkyPreset::SoftSunset) => "soft-sunset",
            PresetVariant::Sky(SkyPreset::DramaticClouds) => "dramatic-clouds",
            PresetVariant::Twilight(TwilightPreset::BlueHour) => "blue-hour",
            PresetVariant::Twilight(TwilightPreset::GoldenHour) => "golden-hour",
            PresetVariant::Lawn(LawnPreset::Natural) => "natural",
            PresetVariant::Lawn(LawnPreset::Lush) => "lush",
            PresetVariant::Hdr(HdrStrength::Subtle) => "subtle",
            PresetVariant::Hdr(HdrStrength::Balanced) => "balanced",
            PresetVariant::Hdr(HdrStrength::Strong) => "strong",
            PresetVariant::Staging(StagingStyle::Modern) => "modern",
            PresetVariant::Staging(StagingStyle::Scandinavian) => "scandinavian",
            PresetVariant::Staging(StagingStyle::Traditional) => "traditional",
            PresetVariant::ColorTemperature(ColorTemperature::Neutral) => "neutral",
            PresetVariant::ColorTemperature(ColorTemperature::Warm) => "warm",
            PresetVariant::ColorTemperature(ColorTemperature::Cool) => "cool",
            PresetVariant::Declutter(DeclutterLevel::Light) => "light",
            PresetVariant::Declutter(DeclutterLevel::Moderate) => "moderate",
            PresetVariant::Declutter(DeclutterLevel::Aggressive) => "aggressive",
        }
    }
}

// ============================================================================
// LockedPresets
// ============================================================================

/// One locked variant per family, per listing.
///
/// Computed once after all analyses are available, before any photo strategy
/// is built; the strategy builder only ever reads from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedPresets {
    pub sky: SkyPreset,
    pub twilight: TwilightPreset,
    pub lawn: LawnPreset,
    pub hdr: HdrStrength,
    pub staging: StagingStyle,
    pub color_temperature: ColorTemperature,
    pub declutter: DeclutterLevel,
}

impl Default for LockedPresets {
    /// Safe defaults used when a listing gives a family no signal.
    fn default() -> Self {
        Self {
            sky: SkyPreset::ClearBlue,
            twilight: TwilightPreset::BlueHour,
            lawn: LawnPreset::Natural,
            hdr: HdrStrength::Balanced,
            staging: StagingStyle::Modern,
            color_temperature: ColorTemperature::Neutral,
            declutter: DeclutterLevel::Moderate,
        }
    }
}

impl LockedPresets {
    /// The locked variant for a family, as the shared union type.
    pub fn variant_for(&self, family: PresetFamily) -> PresetVariant {
        match family {
            PresetFamily::Sky => PresetVariant::Sky(self.sky),
            PresetFamily::Twilight => PresetVariant::Twilight(self.twilight),
            PresetFamily::Lawn => PresetVariant::Lawn(self.lawn),
            PresetFamily::Hdr => PresetVariant::Hdr(self.hdr),
            PresetFamily::Staging => PresetVariant::Staging(self.staging),
            PresetFamily::ColorTemperature => {
                PresetVariant::ColorTemperature(self.color_temperature)
            }
            PresetFamily::Declutter => PresetVariant::Declutter(self.declutter),
        }
    }
}
