//! Listing Lens Core
//!
//! Foundational domain types, error taxonomy, and port traits for the
//! Listing Lens workspace. This crate has zero dependencies on execution
//! infrastructure (HTTP, tokio runtime, providers).
//!
//! ## Module Organization
//!
//! - `error` - Error taxonomy (`PipelineError`, `ProviderError`)
//! - `photo` - Scene classification, scores, deficiencies, `PhotoAnalysis`
//! - `enhancement` - The closed tool set, priorities, execution groups, caps
//! - `presets` - Per-family preset variants and `LockedPresets`
//! - `strategy` - Decisions, roles, caps arithmetic, `ListingStrategy`
//! - `config` - Pipeline configuration with builder methods
//! - `ports` - Boundary traits (providers, storage, analyzer, progress sink)
//! - `progress` - Phase/progress events and the pollable tracker
//! - `result` - Per-photo results, status gate, `ListingResult`
//!
//! ## Design Principles
//!
//! 1. **Closed enums at the seams** - tools, deficiencies, presets, and
//!    phases are tagged variants; consumers match exhaustively
//! 2. **Deterministic collections** - ordered maps everywhere planner
//!    output feeds from, so identical inputs produce identical plans
//! 3. **Unidirectional dependency** - this crate depends on nothing else
//!    in the workspace

pub mod config;
pub mod enhancement;
pub mod error;
pub mod photo;
pub mod ports;
pub mod presets;
pub mod progress;
pub mod result;
pub mod strategy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreResult, PipelineError, ProviderError, ProviderResult};

// ── Photo Domain ───────────────────────────────────────────────────────
pub use photo::{
    Deficiency, DeficiencyKind, DeficiencyMap, PhotoAnalysis, PhotoFeatures, PhotoRef,
    PhotoScores, PhotoSubType, PhotoType,
};

// ── Enhancement Tools ──────────────────────────────────────────────────
pub use enhancement::{CapFamily, ExecutionGroup, Priority, ToolId, ALL_TOOLS};

// ── Presets ────────────────────────────────────────────────────────────
pub use presets::{
    ColorTemperature, DeclutterLevel, HdrStrength, LawnPreset, LockedPresets, PresetFamily,
    PresetVariant, SkyPreset, StagingStyle, TwilightPreset,
};

// ── Strategy ───────────────────────────────────────────────────────────
pub use strategy::{
    CapsUsage, EnhancementDecision, ListingCaps, ListingStrategy, PhotoRole, PhotoStrategy,
    SkippedDecision,
};

// ── Configuration ──────────────────────────────────────────────────────
pub use config::{
    ExecutorConfig, PipelineConfig, SeverityThresholds, StrategyConfig, ValidationConfig,
};

// ── Ports ──────────────────────────────────────────────────────────────
pub use ports::{
    EnhancementProvider, ImageStore, InvokeRequest, NullProgressSink, PhotoAnalyzerBackend,
    ProgressSink, ToolParams,
};

// ── Progress ───────────────────────────────────────────────────────────
pub use progress::{PhotoProgress, PipelinePhase, ProgressEvent, ProgressTracker};

// ── Results ────────────────────────────────────────────────────────────
pub use result::{AppliedTool, ListingResult, ListingStatus, PhotoProcessingResult};
