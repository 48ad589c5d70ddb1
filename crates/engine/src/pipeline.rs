//! Tool Pipelines
//!
//! Expands one accepted decision into the ordered steps the executor
//! interprets generically. Multi-pass tools are data here, not executor
//! branches: twilight is a broad base render followed by a low-strength
//! window-glow refinement seeded with the base output.

use listinglens_core::{EnhancementDecision, PresetVariant, ToolId};

/// Base-pass strength for the twilight render.
const TWILIGHT_BASE_STRENGTH: f32 = 0.85;
/// Refinement strength; low so the pass nudges rather than re-renders.
const TWILIGHT_GLOW_STRENGTH: f32 = 0.35;

/// One provider invocation within a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStep {
    pub tool: ToolId,
    pub strength: f32,
    pub preset: Option<PresetVariant>,
    /// Optional steps fall back to their input ref on failure instead of
    /// failing the photo.
    pub optional: bool,
    /// Stable label used in logs and fallback records
    pub label: &'static str,
}

/// Expand a decision into its executable steps, in order.
pub fn expand(decision: &EnhancementDecision) -> Vec<ToolStep> {
    match decision.tool {
        ToolId::TwilightConversion => vec![
            ToolStep {
                tool: ToolId::TwilightConversion,
                strength: TWILIGHT_BASE_STRENGTH,
                preset: decision.preset,
                optional: false,
                label: "twilight-base",
            },
            ToolStep {
                tool: ToolId::TwilightConversion,
                strength: TWILIGHT_GLOW_STRENGTH,
                preset: decision.preset,
                optional: true,
                label: "window-glow",
            },
        ],
        tool => vec![ToolStep {
            tool,
            strength: default_strength(tool),
            preset: decision.preset,
            optional: false,
            label: "apply",
        }],
    }
}

/// Default single-pass strength per tool.
fn default_strength(tool: ToolId) -> f32 {
    match tool {
        ToolId::SkyReplacement => 0.9,
        ToolId::TwilightConversion => TWILIGHT_BASE_STRENGTH,
        ToolId::LawnRepair => 0.7,
        ToolId::VirtualStaging => 0.9,
        ToolId::Declutter => 0.75,
        ToolId::HdrBoost => 0.6,
        ToolId::PerspectiveCorrection => 0.8,
        ToolId::ColorBalance => 0.5,
        ToolId::PoolEnhancement => 0.7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listinglens_core::{Priority, TwilightPreset};

    fn decision(tool: ToolId) -> EnhancementDecision {
        EnhancementDecision {
            tool,
            preset: None,
            reason: "test".to_string(),
            priority: Priority::Medium,
        }
    }

    #[test]
    fn test_twilight_expands_to_two_passes() {
        let mut d = decision(ToolId::TwilightConversion);
        d.preset = Some(PresetVariant::Twilight(TwilightPreset::BlueHour));
        let steps = expand(&d);

        assert_eq!(steps.len(), 2);
        assert!(!steps[0].optional);
        assert_eq!(steps[0].strength, TWILIGHT_BASE_STRENGTH);
        assert!(steps[1].optional);
        assert_eq!(steps[1].label, "window-glow");
        assert!(steps[1].strength < steps[0].strength);
        // Both passes carry the locked preset
        assert_eq!(steps[0].preset, steps[1].preset);
    }

    #[test]
    fn test_single_pass_tools_expand_to_one_required_step() {
        for tool in [ToolId::SkyReplacement, ToolId::Declutter, ToolId::ColorBalance] {
            let steps = expand(&decision(tool));
            assert_eq!(steps.len(), 1);
            assert!(!steps[0].optional);
            assert_eq!(steps[0].tool, tool);
        }
    }
}
