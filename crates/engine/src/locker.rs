//! Preset Locker
//!
//! Locks one variant per enhancement family for the whole listing, from the
//! complete set of analyses. Pure function: no side effects, no provider
//! calls, and no photo may be strategized before it returns.

use tracing::debug;

use listinglens_core::{
    ColorTemperature, DeclutterLevel, DeficiencyKind, HdrStrength, LawnPreset, LockedPresets,
    PhotoAnalysis, SkyPreset, StagingStyle, StrategyConfig, TwilightPreset,
};

/// Derive the listing's locked presets from its analyses.
pub fn lock_presets(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> LockedPresets {
    let presets = LockedPresets {
        sky: lock_sky(analyses, config),
        twilight: lock_twilight(analyses, config),
        lawn: lock_lawn(analyses, config),
        hdr: lock_hdr(analyses, config),
        staging: lock_staging(analyses, config),
        color_temperature: lock_color_temperature(analyses, config),
        declutter: lock_declutter(analyses, config),
    };
    debug!(?presets, "presets locked");
    presets
}

/// Sky preset from the best exterior and the proportion of exteriors whose
/// sky is already acceptable. A majority of acceptable skies forbids the
/// dramatic look; otherwise ties favor the more dramatic preset.
fn lock_sky(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> SkyPreset {
    let skied: Vec<&PhotoAnalysis> = analyses
        .iter()
        .filter(|a| a.photo_type.is_exterior() && a.features.has_sky)
        .collect();
    if skied.is_empty() {
        return SkyPreset::ClearBlue;
    }

    let acceptable = skied
        .iter()
        .filter(|a| a.deficiencies.severity(DeficiencyKind::Sky) < config.acceptable_sky_severity)
        .count();
    if acceptable * 2 > skied.len() {
        return SkyPreset::ClearBlue;
    }

    let best_hero = skied.iter().map(|a| a.hero_score).max().unwrap_or(0);
    if best_hero >= config.dramatic_sky_hero_threshold {
        SkyPreset::DramaticClouds
    } else {
        SkyPreset::SoftSunset
    }
}

/// Blue-hour is the universally safe default; golden-hour is reserved for
/// photogenic listings.
fn lock_twilight(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> TwilightPreset {
    if mean(analyses.iter().map(|a| a.hero_score)) > config.golden_hour_threshold as f32 {
        TwilightPreset::GoldenHour
    } else {
        TwilightPreset::BlueHour
    }
}

fn lock_lawn(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> LawnPreset {
    let severities: Vec<u8> = analyses
        .iter()
        .filter(|a| a.photo_type.is_exterior() && a.features.has_lawn)
        .map(|a| a.deficiencies.severity(DeficiencyKind::Lawn))
        .collect();
    if !severities.is_empty() && mean(severities.iter().copied()) >= config.lush_lawn_severity as f32
    {
        LawnPreset::Lush
    } else {
        LawnPreset::Natural
    }
}

fn lock_hdr(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> HdrStrength {
    let lighting = mean(analyses.iter().map(|a| a.scores.lighting));
    if lighting < config.strong_hdr_lighting as f32 {
        HdrStrength::Strong
    } else if lighting < config.balanced_hdr_lighting as f32 {
        HdrStrength::Balanced
    } else {
        HdrStrength::Subtle
    }
}

fn lock_staging(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> StagingStyle {
    let compositions: Vec<u8> = analyses
        .iter()
        .filter(|a| a.photo_type.is_interior())
        .map(|a| a.scores.composition)
        .collect();
    if compositions.is_empty() {
        return StagingStyle::Modern;
    }
    let mean_composition = mean(compositions.iter().copied());
    if mean_composition >= config.staging_modern_threshold as f32 {
        StagingStyle::Modern
    } else if mean_composition >= config.staging_scandinavian_threshold as f32 {
        StagingStyle::Scandinavian
    } else {
        StagingStyle::Traditional
    }
}

fn lock_color_temperature(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> ColorTemperature {
    let interiors: Vec<&PhotoAnalysis> = analyses
        .iter()
        .filter(|a| a.photo_type.is_interior())
        .collect();
    if interiors.is_empty() {
        return ColorTemperature::Neutral;
    }

    let dark = interiors
        .iter()
        .filter(|a| a.scores.lighting < config.dark_room_lighting)
        .count();
    if dark as f32 / interiors.len() as f32 > config.warm_dark_ratio {
        return ColorTemperature::Warm;
    }
    if mean(interiors.iter().map(|a| a.scores.lighting)) >= config.cool_lighting_mean as f32 {
        ColorTemperature::Cool
    } else {
        ColorTemperature::Neutral
    }
}

fn lock_declutter(analyses: &[PhotoAnalysis], config: &StrategyConfig) -> DeclutterLevel {
    let interiors: Vec<&PhotoAnalysis> = analyses
        .iter()
        .filter(|a| a.photo_type.is_interior())
        .collect();
    if interiors.is_empty() {
        return DeclutterLevel::Light;
    }

    let cluttered = interiors
        .iter()
        .filter(|a| a.deficiencies.severity(DeficiencyKind::Clutter) >= config.cluttered_severity)
        .count();
    let ratio = cluttered as f32 / interiors.len() as f32;
    if ratio > config.aggressive_clutter_ratio {
        DeclutterLevel::Aggressive
    } else if ratio > config.moderate_clutter_ratio {
        DeclutterLevel::Moderate
    } else {
        DeclutterLevel::Light
    }
}

fn mean(values: impl Iterator<Item = u8>) -> f32 {
    let collected: Vec<u8> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().map(|v| *v as u32).sum::<u32>() as f32 / collected.len() as f32
}
