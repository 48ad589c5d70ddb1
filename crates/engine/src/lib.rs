//! Listing preparation engine
//!
//! The decision and execution stages of the pipeline:
//! - `analyzer` - sequential analysis stage with degraded fallback
//! - `locker` - per-listing preset locking
//! - `builder` - the strategy builder (roles, candidates, cap allocation)
//! - `pipeline` - decision-to-step expansion for multi-pass tools
//! - `executor` - bounded-concurrency batch execution
//! - `orchestrator` - end-to-end `prepare_listing` sequencing

pub mod analyzer;
pub mod builder;
pub mod executor;
pub mod locker;
pub mod orchestrator;
pub mod pipeline;

// ── Stages ──
pub use analyzer::ListingAnalyzer;
pub use builder::build_strategy;
pub use locker::lock_presets;

// ── Execution ──
pub use executor::BatchExecutor;
pub use pipeline::{expand, ToolStep};

// ── Entry point ──
pub use orchestrator::ListingPipeline;
