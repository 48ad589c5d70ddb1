//! Pipeline Configuration
//!
//! Nested configuration for the three decision-bearing stages. Every
//! threshold the planner uses is configurable here; the defaults are the
//! recommended policy, not hard-coded behavior.
//!
//! Each config follows the builder pattern: create with `Default`, chain
//! `with_*` calls.

use std::time::Duration;

// ============================================================================
// Strategy
// ============================================================================

/// Severity cut points mapping deficiency severity to decision priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityThresholds {
    pub critical: u8,
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 80,
            high: 60,
            medium: 40,
            low: 20,
        }
    }
}

/// Knobs for preset locking and strategy building.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Fraction of photos (by hero score) assigned the hero role
    pub hero_percentage: f32,
    /// Fraction of photos (from the bottom) assigned the utility role
    pub utility_percentage: f32,
    /// Severity-to-priority cut points
    pub severity: SeverityThresholds,
    /// Whether a twilight conversion is planned at all
    pub twilight_enabled: bool,
    /// Mean listing hero score above which twilight escalates to golden-hour
    pub golden_hour_threshold: u8,
    /// Sky deficiency severity below which an exterior's sky counts as acceptable
    pub acceptable_sky_severity: u8,
    /// Exterior hero score at or above which the dramatic sky preset is preferred
    pub dramatic_sky_hero_threshold: u8,
    /// Interior mean composition at or above which staging locks to Modern
    pub staging_modern_threshold: u8,
    /// Interior mean composition at or above which staging locks to Scandinavian
    pub staging_scandinavian_threshold: u8,
    /// Lighting score below which a room counts as dark
    pub dark_room_lighting: u8,
    /// Proportion of dark rooms above which color temperature locks to Warm
    pub warm_dark_ratio: f32,
    /// Mean interior lighting above which color temperature locks to Cool
    pub cool_lighting_mean: u8,
    /// Clutter severity at or above which a room counts as cluttered
    pub cluttered_severity: u8,
    /// Cluttered-room proportion above which declutter locks to Aggressive
    pub aggressive_clutter_ratio: f32,
    /// Cluttered-room proportion above which declutter locks to Moderate
    pub moderate_clutter_ratio: f32,
    /// Mean exterior lawn severity at or above which lawn locks to Lush
    pub lush_lawn_severity: u8,
    /// Mean lighting below which HDR locks to Strong
    pub strong_hdr_lighting: u8,
    /// Mean lighting below which HDR locks to Balanced
    pub balanced_hdr_lighting: u8,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            hero_percentage: 0.15,
            utility_percentage: 0.20,
            severity: SeverityThresholds::default(),
            twilight_enabled: true,
            golden_hour_threshold: 75,
            acceptable_sky_severity: 40,
            dramatic_sky_hero_threshold: 70,
            staging_modern_threshold: 70,
            staging_scandinavian_threshold: 50,
            dark_room_lighting: 45,
            warm_dark_ratio: 0.4,
            cool_lighting_mean: 80,
            cluttered_severity: 40,
            aggressive_clutter_ratio: 0.5,
            moderate_clutter_ratio: 0.25,
            lush_lawn_severity: 60,
            strong_hdr_lighting: 50,
            balanced_hdr_lighting: 70,
        }
    }
}

impl StrategyConfig {
    pub fn with_hero_percentage(mut self, pct: f32) -> Self {
        self.hero_percentage = pct;
        self
    }

    pub fn with_utility_percentage(mut self, pct: f32) -> Self {
        self.utility_percentage = pct;
        self
    }

    pub fn with_severity(mut self, severity: SeverityThresholds) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_twilight_enabled(mut self, enabled: bool) -> Self {
        self.twilight_enabled = enabled;
        self
    }

    pub fn with_golden_hour_threshold(mut self, threshold: u8) -> Self {
        self.golden_hour_threshold = threshold;
        self
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Knobs for batch execution against remote providers.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Concurrent photos in flight. Deliberately conservative: the shared
    /// backends are rate limited.
    pub concurrency: usize,
    /// Minimum spacing between consecutive outbound calls, process-wide
    pub min_call_interval: Duration,
    /// Wall-clock budget per provider call
    pub call_timeout: Duration,
    /// Bounded retry count for rate-limited calls
    pub max_rate_limit_retries: u32,
    /// Base delay for exponential retry backoff
    pub retry_backoff_base: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            min_call_interval: Duration::from_secs(10),
            call_timeout: Duration::from_secs(120),
            max_rate_limit_retries: 3,
            retry_backoff_base: Duration::from_secs(2),
        }
    }
}

impl ExecutorConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Knobs for the accept/review gate.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Confidence at or above which the listing is fully trusted
    pub prepared_threshold: u8,
    /// Confidence at or above which the listing is still `prepared`
    /// (lower trust); below it, `needs_review`
    pub review_threshold: u8,
    /// When true, any consistency flag downgrades a prepared listing to
    /// needs_review. Policy knob, default off.
    pub consistency_flags_force_review: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            prepared_threshold: 85,
            review_threshold: 70,
            consistency_flags_force_review: false,
        }
    }
}

impl ValidationConfig {
    pub fn with_review_threshold(mut self, threshold: u8) -> Self {
        self.review_threshold = threshold;
        self
    }

    pub fn with_consistency_flags_force_review(mut self, force: bool) -> Self {
        self.consistency_flags_force_review = force;
        self
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub strategy: StrategyConfig,
    pub executor: ExecutorConfig,
    pub validation: ValidationConfig,
}

impl PipelineConfig {
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }
}
