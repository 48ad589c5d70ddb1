//! Strategy Builder
//!
//! The core decision engine: role assignment, per-photo candidate decisions
//! from deficiencies, listing-wide cap allocation, and tool ordering.
//! Deterministic given the same inputs - stable sorts only, keyed on
//! (hero score desc, photo id asc), no randomness, no clock reads.

use tracing::{debug, warn};

use listinglens_core::{
    CapsUsage, CoreResult, EnhancementDecision, ListingCaps, ListingStrategy, LockedPresets,
    PhotoAnalysis, PhotoRole, PhotoStrategy, PipelineError, PresetVariant, Priority,
    SkippedDecision, StrategyConfig, ToolId,
};

/// One candidate decision awaiting cap allocation.
struct Candidate {
    photo_id: String,
    tool: ToolId,
    preset: Option<PresetVariant>,
    reason: String,
    priority: Priority,
    role: PhotoRole,
    /// Index in the hero-sorted photo order, for stable tie-breaks
    position: usize,
}

/// Build the complete plan for one listing.
pub fn build_strategy(
    listing_id: &str,
    analyses: &[PhotoAnalysis],
    locked: &LockedPresets,
    config: &StrategyConfig,
) -> CoreResult<ListingStrategy> {
    if analyses.is_empty() {
        return Err(PipelineError::EmptyListing);
    }

    // Hero-sorted order: hero score descending, photo id ascending.
    let mut order: Vec<&PhotoAnalysis> = analyses.iter().collect();
    order.sort_by(|a, b| {
        b.hero_score
            .cmp(&a.hero_score)
            .then_with(|| a.photo_id.cmp(&b.photo_id))
    });

    let total = order.len();
    let hero_count = (((total as f32) * config.hero_percentage).ceil() as usize).max(1);
    let utility_count =
        (((total as f32) * config.utility_percentage).ceil() as usize).min(total - hero_count);

    let role_for = |position: usize| -> PhotoRole {
        if position < hero_count {
            PhotoRole::Hero
        } else if position >= total - utility_count {
            PhotoRole::Utility
        } else {
            PhotoRole::Supporting
        }
    };

    let hero_photo_id = order[0].photo_id.clone();

    // Twilight photo: the best exterior that actually shows sky.
    let twilight_photo_id = if config.twilight_enabled {
        order
            .iter()
            .find(|a| a.photo_type.is_exterior() && a.features.has_sky)
            .map(|a| a.photo_id.clone())
    } else {
        None
    };

    let mut candidates = collect_candidates(&order, &role_for, twilight_photo_id.as_deref(), locked, config);

    // Cap allocation: priority weight first, then hero advantage, then the
    // stable photo order. Rejections are dropped, never deferred.
    candidates.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then_with(|| a.role.rank().cmp(&b.role.rank()))
            .then_with(|| a.position.cmp(&b.position))
    });

    let caps = ListingCaps::for_listing(total);
    let mut caps_usage = CapsUsage::new();
    let mut accepted: Vec<Candidate> = Vec::new();
    let mut skipped: Vec<SkippedDecision> = Vec::new();

    for candidate in candidates {
        if let Some(family) = candidate.tool.cap_family() {
            if !caps_usage.try_consume(family, &caps) {
                warn!(
                    photo_id = %candidate.photo_id,
                    tool = %candidate.tool,
                    cap = caps.cap(family),
                    "candidate dropped, cap exhausted"
                );
                skipped.push(SkippedDecision {
                    photo_id: candidate.photo_id,
                    tool: candidate.tool,
                    reason: format!("{} cap exhausted ({} allowed)", family, caps.cap(family)),
                });
                continue;
            }
        }
        accepted.push(candidate);
    }

    // Assemble per-photo strategies in the hero-sorted order.
    let mut photos = Vec::with_capacity(total);
    for (position, analysis) in order.iter().enumerate() {
        let mut decisions: Vec<EnhancementDecision> = accepted
            .iter()
            .filter(|c| c.photo_id == analysis.photo_id)
            .map(|c| EnhancementDecision {
                tool: c.tool,
                preset: c.preset,
                reason: c.reason.clone(),
                priority: c.priority,
            })
            .collect();
        // Within a photo, run order is structural -> content -> polish,
        // never priority order.
        decisions.sort_by_key(|d| d.tool.execution_group());

        let candidate_count = decisions.len()
            + skipped
                .iter()
                .filter(|s| s.photo_id == analysis.photo_id)
                .count();
        let serviced_ratio = if candidate_count == 0 {
            1.0
        } else {
            decisions.len() as f32 / candidate_count as f32
        };
        let confidence =
            (analysis.analysis_confidence as f32 * (0.6 + 0.4 * serviced_ratio)).round() as u8;

        photos.push(PhotoStrategy {
            photo_id: analysis.photo_id.clone(),
            role: role_for(position),
            decisions,
            confidence,
        });
    }

    let mut confidence_score = (photos.iter().map(|p| p.confidence as u32).sum::<u32>()
        / photos.len() as u32) as u8;
    // The hero not getting its full complement is worse than any other
    // photo missing one.
    if skipped.iter().any(|s| s.photo_id == hero_photo_id) {
        confidence_score = confidence_score.saturating_sub(10);
    }

    debug!(
        listing_id,
        photos = photos.len(),
        skipped = skipped.len(),
        confidence = confidence_score,
        "strategy built"
    );

    Ok(ListingStrategy {
        listing_id: listing_id.to_string(),
        photos,
        locked_presets: *locked,
        caps,
        caps_usage,
        skipped,
        hero_photo_id,
        twilight_photo_id,
        confidence_score,
    })
}

fn collect_candidates(
    order: &[&PhotoAnalysis],
    role_for: &dyn Fn(usize) -> PhotoRole,
    twilight_photo_id: Option<&str>,
    locked: &LockedPresets,
    config: &StrategyConfig,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (position, analysis) in order.iter().enumerate() {
        let role = role_for(position);
        let is_twilight_photo = twilight_photo_id == Some(analysis.photo_id.as_str());

        if is_twilight_photo {
            candidates.push(Candidate {
                photo_id: analysis.photo_id.clone(),
                tool: ToolId::TwilightConversion,
                preset: Some(locked.variant_for(listinglens_core::PresetFamily::Twilight)),
                reason: "best exterior selected for twilight conversion".to_string(),
                priority: Priority::High,
                role,
                position,
            });
        }

        for (kind, deficiency) in analysis.deficiencies.iter() {
            let Some(priority) = Priority::from_severity(deficiency.severity, &config.severity)
            else {
                continue;
            };
            let tool = ToolId::for_deficiency(*kind);
            // The twilight render replaces the sky wholesale; a separate
            // sky pass on the same photo would be wasted spend.
            if is_twilight_photo && tool == ToolId::SkyReplacement {
                debug!(photo_id = %analysis.photo_id, "sky candidate superseded by twilight");
                continue;
            }
            candidates.push(Candidate {
                photo_id: analysis.photo_id.clone(),
                tool,
                preset: tool.preset_family().map(|f| locked.variant_for(f)),
                reason: format!("{} deficiency, severity {}", kind, deficiency.severity),
                priority,
                role,
                position,
            });
        }

        if analysis.photo_type.is_interior() && analysis.features.is_empty {
            candidates.push(Candidate {
                photo_id: analysis.photo_id.clone(),
                tool: ToolId::VirtualStaging,
                preset: Some(locked.variant_for(listinglens_core::PresetFamily::Staging)),
                reason: "empty interior, staging candidate".to_string(),
                priority: Priority::High,
                role,
                position,
            });
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use listinglens_core::{
        CapFamily, DeficiencyKind, DeficiencyMap, ExecutionGroup, PhotoFeatures, PhotoScores,
        PhotoSubType, PhotoType,
    };

    fn photo(
        id: &str,
        photo_type: PhotoType,
        hero_score: u8,
        deficiencies: DeficiencyMap,
        features: PhotoFeatures,
    ) -> PhotoAnalysis {
        PhotoAnalysis {
            photo_id: id.to_string(),
            photo_type,
            sub_type: PhotoSubType::Other,
            scores: PhotoScores::new(60, 60, 60),
            deficiencies,
            features,
            hero_score,
            analysis_confidence: 90,
        }
    }

    fn blown_sky_exterior(id: &str, hero_score: u8) -> PhotoAnalysis {
        photo(
            id,
            PhotoType::Exterior,
            hero_score,
            DeficiencyMap::new().with(DeficiencyKind::Sky, 85),
            PhotoFeatures {
                has_sky: true,
                ..Default::default()
            },
        )
    }

    fn plain_interior(id: &str, hero_score: u8) -> PhotoAnalysis {
        photo(
            id,
            PhotoType::Interior,
            hero_score,
            DeficiencyMap::new(),
            PhotoFeatures::default(),
        )
    }

    fn twenty_photo_listing() -> Vec<PhotoAnalysis> {
        let mut analyses = vec![
            blown_sky_exterior("ext1", 95),
            blown_sky_exterior("ext2", 80),
            blown_sky_exterior("ext3", 75),
            blown_sky_exterior("ext4", 70),
        ];
        for i in 0..16 {
            analyses.push(plain_interior(&format!("int{:02}", i), 60 - i as u8));
        }
        analyses
    }

    fn build(analyses: &[PhotoAnalysis]) -> ListingStrategy {
        let config = StrategyConfig::default().with_twilight_enabled(false);
        build_strategy("l1", analyses, &LockedPresets::default(), &config).unwrap()
    }

    #[test]
    fn test_empty_listing_fails() {
        let result = build_strategy(
            "l1",
            &[],
            &LockedPresets::default(),
            &StrategyConfig::default(),
        );
        assert!(matches!(result, Err(PipelineError::EmptyListing)));
    }

    #[test]
    fn test_sky_cap_drops_fourth_exterior() {
        let strategy = build(&twenty_photo_listing());

        // min(3, ceil(20 * 0.15)) = 3 of the 4 blown skies serviced
        assert_eq!(strategy.caps.sky, 3);
        assert_eq!(strategy.assignments(ToolId::SkyReplacement), 3);

        let dropped: Vec<_> = strategy
            .skipped
            .iter()
            .filter(|s| s.tool == ToolId::SkyReplacement)
            .collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].photo_id, "ext4");
        assert!(dropped[0].reason.contains("cap exhausted"));

        // All accepted sky decisions carry the same locked preset
        let locked_sky = LockedPresets::default()
            .variant_for(listinglens_core::PresetFamily::Sky);
        for p in &strategy.photos {
            for d in &p.decisions {
                if d.tool == ToolId::SkyReplacement {
                    assert_eq!(d.preset, Some(locked_sky));
                }
            }
        }
    }

    #[test]
    fn test_cap_invariant_holds_for_every_family() {
        let strategy = build(&twenty_photo_listing());
        for (tool, family) in [
            (ToolId::SkyReplacement, CapFamily::Sky),
            (ToolId::TwilightConversion, CapFamily::Twilight),
            (ToolId::VirtualStaging, CapFamily::Staging),
            (ToolId::Declutter, CapFamily::Declutter),
            (ToolId::LawnRepair, CapFamily::Lawn),
            (ToolId::PoolEnhancement, CapFamily::Pool),
        ] {
            assert!(strategy.assignments(tool) as u32 <= strategy.caps.cap(family));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let analyses = twenty_photo_listing();
        let a = build(&analyses);
        let b = build(&analyses);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_hero_is_unique_and_has_hero_role() {
        let strategy = build(&twenty_photo_listing());
        assert_eq!(strategy.hero_photo_id, "ext1");
        let hero = strategy.photo("ext1").unwrap();
        assert_eq!(hero.role, PhotoRole::Hero);
        let hero_count = strategy
            .photos
            .iter()
            .filter(|p| p.photo_id == strategy.hero_photo_id)
            .count();
        assert_eq!(hero_count, 1);
    }

    #[test]
    fn test_priority_precedence_under_cap_pressure() {
        // Two sky candidates, cap of 1 (small listing): the critical one
        // wins even though the low one belongs to the higher-scoring photo.
        let analyses = vec![
            photo(
                "weak",
                PhotoType::Exterior,
                90,
                DeficiencyMap::new().with(DeficiencyKind::Sky, 25),
                PhotoFeatures {
                    has_sky: true,
                    ..Default::default()
                },
            ),
            blown_sky_exterior("severe", 40),
            plain_interior("int1", 30),
        ];
        let strategy = build(&analyses);

        assert_eq!(strategy.caps.sky, 1);
        let serviced = strategy.photo("severe").unwrap();
        assert!(serviced.decisions.iter().any(|d| d.tool == ToolId::SkyReplacement));
        assert!(strategy.skipped.iter().any(|s| s.photo_id == "weak"));
    }

    #[test]
    fn test_below_low_severity_produces_no_decision() {
        let analyses = vec![photo(
            "p1",
            PhotoType::Interior,
            50,
            DeficiencyMap::new().with(DeficiencyKind::Color, 10),
            PhotoFeatures::default(),
        )];
        let strategy = build(&analyses);
        assert!(strategy.photos[0].decisions.is_empty());
        assert!(strategy.skipped.is_empty());
    }

    #[test]
    fn test_tool_order_respects_execution_groups() {
        let analyses = vec![photo(
            "p1",
            PhotoType::Interior,
            50,
            DeficiencyMap::new()
                .with(DeficiencyKind::Lighting, 70)
                .with(DeficiencyKind::Clutter, 70)
                .with(DeficiencyKind::Color, 45),
            PhotoFeatures::default(),
        )];
        let strategy = build(&analyses);
        let groups: Vec<ExecutionGroup> = strategy.photos[0]
            .decisions
            .iter()
            .map(|d| d.tool.execution_group())
            .collect();
        let mut sorted = groups.clone();
        sorted.sort();
        assert_eq!(groups, sorted);
        assert_eq!(strategy.photos[0].decisions[0].tool, ToolId::Declutter);
    }

    #[test]
    fn test_twilight_photo_selection() {
        let analyses = vec![
            plain_interior("int1", 95),
            blown_sky_exterior("ext1", 80),
            blown_sky_exterior("ext2", 60),
        ];
        let strategy = build_strategy(
            "l1",
            &analyses,
            &LockedPresets::default(),
            &StrategyConfig::default(),
        )
        .unwrap();

        // Best exterior with sky, not the interior hero
        assert_eq!(strategy.twilight_photo_id.as_deref(), Some("ext1"));
        let twilight = strategy.photo("ext1").unwrap();
        assert!(twilight
            .decisions
            .iter()
            .any(|d| d.tool == ToolId::TwilightConversion));
        // Its sky candidate is superseded by the twilight render
        assert!(!twilight
            .decisions
            .iter()
            .any(|d| d.tool == ToolId::SkyReplacement));
    }

    #[test]
    fn test_empty_interior_gets_staging_candidate() {
        let analyses = vec![photo(
            "p1",
            PhotoType::Interior,
            50,
            DeficiencyMap::new(),
            PhotoFeatures {
                is_empty: true,
                ..Default::default()
            },
        )];
        let strategy = build(&analyses);
        assert!(strategy.photos[0]
            .decisions
            .iter()
            .any(|d| d.tool == ToolId::VirtualStaging));
    }

    #[test]
    fn test_degraded_photo_gets_no_decisions_and_low_confidence() {
        let mut analyses = twenty_photo_listing();
        analyses.push(PhotoAnalysis::degraded("broken"));
        let strategy = build(&analyses);
        let degraded = strategy.photo("broken").unwrap();
        assert!(degraded.decisions.is_empty());
        assert_eq!(degraded.confidence, 0);
    }
}
