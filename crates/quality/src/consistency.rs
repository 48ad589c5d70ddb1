//! Consistency Pass
//!
//! Post-execution check that every finished photo matches the listing's
//! locked look. Flags are informational input to the validator and the
//! final status; this pass never re-executes tools.

use tracing::warn;

use listinglens_core::{ListingStrategy, PhotoProcessingResult};

use crate::models::{ConsistencyFlag, ConsistencyFlagKind};

/// Compare applied tools against the locked presets.
///
/// For every successful photo, each applied tool with a preset family must
/// carry exactly the locked variant for that family. Refinement fallbacks
/// recorded by the executor become informational flags.
pub fn check_consistency(
    results: &[PhotoProcessingResult],
    strategy: &ListingStrategy,
) -> Vec<ConsistencyFlag> {
    let mut flags = Vec::new();

    for result in results.iter().filter(|r| r.success) {
        for applied in &result.applied {
            let Some(family) = applied.tool.preset_family() else {
                continue;
            };
            let locked = strategy.locked_presets.variant_for(family);
            if applied.preset != Some(locked) {
                warn!(
                    photo_id = %result.photo_id,
                    tool = %applied.tool,
                    family = %family,
                    "applied preset diverges from locked variant"
                );
                flags.push(ConsistencyFlag {
                    photo_id: result.photo_id.clone(),
                    kind: ConsistencyFlagKind::PresetMismatch {
                        family,
                        tool: applied.tool,
                    },
                    detail: format!(
                        "{} applied {:?}, listing locked {:?}",
                        applied.tool, applied.preset, locked
                    ),
                });
            }
        }

        for label in &result.fallbacks {
            flags.push(ConsistencyFlag {
                photo_id: result.photo_id.clone(),
                kind: ConsistencyFlagKind::RefinementFellBack {
                    label: label.clone(),
                },
                detail: format!("{} pass fell back to its base result", label),
            });
        }
    }

    flags
}
