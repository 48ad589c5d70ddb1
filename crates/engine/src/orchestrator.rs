//! Listing Pipeline Orchestrator
//!
//! Top-level sequencing: Analyze -> Lock -> Build -> Execute ->
//! Consistency -> Validate -> final status. Stages run strictly in order;
//! every stage sees the whole listing before the next starts, because caps
//! and locked presets are listing-wide. Idempotent: no hidden state
//! survives between runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use listinglens_core::{
    ListingResult, ListingStatus, PhotoAnalyzerBackend, PipelineConfig, PipelineError,
    PipelinePhase, PhotoRef, ProgressEvent, ProgressSink, ProgressTracker,
};
use listinglens_providers::{ProviderRouter, RateLimiter};
use listinglens_quality::{check_consistency, validate};

use crate::analyzer::ListingAnalyzer;
use crate::builder;
use crate::executor::BatchExecutor;
use crate::locker;

/// The complete listing preparation pipeline.
pub struct ListingPipeline {
    analyzer: ListingAnalyzer,
    executor: BatchExecutor,
    config: PipelineConfig,
    tracker: ProgressTracker,
}

impl ListingPipeline {
    /// Build a pipeline with a rate limiter derived from the executor
    /// config.
    pub fn new(
        backend: Arc<dyn PhotoAnalyzerBackend>,
        router: Arc<ProviderRouter>,
        sink: Arc<dyn ProgressSink>,
        config: PipelineConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.executor.min_call_interval));
        Self::with_rate_limiter(backend, router, limiter, sink, config)
    }

    /// Build a pipeline around an injected rate limiter. Independent
    /// pipelines with independent limiters never cross-contaminate call
    /// timing.
    pub fn with_rate_limiter(
        backend: Arc<dyn PhotoAnalyzerBackend>,
        router: Arc<ProviderRouter>,
        rate_limiter: Arc<RateLimiter>,
        sink: Arc<dyn ProgressSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            analyzer: ListingAnalyzer::new(backend),
            executor: BatchExecutor::new(router, rate_limiter, config.executor.clone()),
            tracker: ProgressTracker::new(sink),
            config,
        }
    }

    /// Current progress snapshot; agrees with the emitted event stream.
    pub fn progress(&self) -> ProgressEvent {
        self.tracker.snapshot()
    }

    /// Prepare one listing end to end.
    pub async fn prepare_listing(&self, listing_id: &str, photos: &[PhotoRef]) -> ListingResult {
        self.prepare_listing_with_cancel(listing_id, photos, &CancellationToken::new())
            .await
    }

    /// Prepare one listing, abortable via the token. Cancellation lets the
    /// in-flight provider call finish, then fails the run.
    pub async fn prepare_listing_with_cancel(
        &self,
        listing_id: &str,
        photos: &[PhotoRef],
        cancel: &CancellationToken,
    ) -> ListingResult {
        self.tracker.reset();
        let run_id = Uuid::new_v4().to_string();
        info!(listing_id, run_id = %run_id, photos = photos.len(), "preparing listing");

        if photos.is_empty() {
            let error = PipelineError::EmptyListing.to_string();
            self.emit_terminal(PipelinePhase::Failed, &error);
            return ListingResult::failed(listing_id, run_id, error);
        }

        let analyses = self.analyzer.analyze_all(photos, &self.tracker).await;
        if cancel.is_cancelled() {
            return self.cancelled(listing_id, run_id);
        }

        self.tracker.emit(ProgressEvent::new(
            PipelinePhase::Strategizing,
            30,
            "Locking listing presets",
        ));
        let locked = locker::lock_presets(&analyses, &self.config.strategy);
        let strategy =
            match builder::build_strategy(listing_id, &analyses, &locked, &self.config.strategy) {
                Ok(strategy) => strategy,
                Err(e) => {
                    warn!(listing_id, error = %e, "strategy build failed");
                    let error = e.to_string();
                    self.emit_terminal(PipelinePhase::Failed, &error);
                    return ListingResult::failed(listing_id, run_id, error);
                }
            };
        self.tracker.emit(ProgressEvent::new(
            PipelinePhase::Strategizing,
            40,
            format!("Strategy built for {} photos", strategy.photos.len()),
        ));

        let photo_refs: BTreeMap<String, String> = photos
            .iter()
            .map(|p| (p.id.clone(), p.storage_ref.clone()))
            .collect();
        let per_photo = self
            .executor
            .execute(&strategy, &photo_refs, &self.tracker, cancel)
            .await;
        if cancel.is_cancelled() {
            return self.cancelled(listing_id, run_id);
        }

        self.tracker.emit(ProgressEvent::new(
            PipelinePhase::Validating,
            90,
            "Checking consistency and quality",
        ));
        let flags = check_consistency(&per_photo, &strategy);
        let report = validate(&per_photo, &strategy, &flags, &self.config.validation);

        let mut status = ListingStatus::from_confidence(report.overall_score, &self.config.validation);
        if status == ListingStatus::Prepared
            && self.config.validation.consistency_flags_force_review
            && flags.iter().any(|f| !f.is_informational())
        {
            warn!(listing_id, "consistency flags forcing review");
            status = ListingStatus::NeedsReview;
        }

        let total_cost_cents = per_photo.iter().map(|r| r.cost_cents).sum();
        let errors: Vec<String> = per_photo.iter().filter_map(|r| r.error.clone()).collect();

        let phase = match status {
            ListingStatus::Prepared => PipelinePhase::Completed,
            ListingStatus::NeedsReview => PipelinePhase::NeedsReview,
            ListingStatus::Failed => PipelinePhase::Failed,
        };
        self.emit_terminal(phase, format!("Listing {}", status));
        info!(
            listing_id,
            run_id = %run_id,
            status = %status,
            confidence = report.overall_score,
            cost_cents = total_cost_cents,
            "listing run finished"
        );

        ListingResult {
            listing_id: listing_id.to_string(),
            run_id,
            status,
            hero_photo_id: Some(strategy.hero_photo_id.clone()),
            twilight_photo_id: strategy.twilight_photo_id.clone(),
            per_photo,
            confidence_score: report.overall_score,
            total_cost_cents,
            errors,
        }
    }

    fn cancelled(&self, listing_id: &str, run_id: String) -> ListingResult {
        let error = PipelineError::Cancelled.to_string();
        warn!(listing_id, "listing run cancelled");
        self.emit_terminal(PipelinePhase::Failed, &error);
        ListingResult::failed(listing_id, run_id, error)
    }

    fn emit_terminal(&self, phase: PipelinePhase, message: impl Into<String>) {
        self.tracker
            .emit(ProgressEvent::new(phase, 100, message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use listinglens_core::{CoreResult, NullProgressSink, PhotoAnalysis, PhotoAnalyzerBackend};

    struct NoopBackend;

    #[async_trait]
    impl PhotoAnalyzerBackend for NoopBackend {
        async fn analyze(&self, photo: &PhotoRef) -> CoreResult<PhotoAnalysis> {
            Ok(PhotoAnalysis::degraded(&photo.id))
        }
    }

    fn pipeline() -> ListingPipeline {
        ListingPipeline::new(
            Arc::new(NoopBackend),
            Arc::new(ProviderRouter::new()),
            Arc::new(NullProgressSink),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_listing_fails() {
        let result = pipeline().prepare_listing("l1", &[]).await;
        assert_eq!(result.status, ListingStatus::Failed);
        assert!(result.errors[0].contains("no photos"));
        assert_eq!(pipeline().progress().progress, 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_fails_with_cancelled() {
        let p = pipeline();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = p
            .prepare_listing_with_cancel("l1", &[PhotoRef::new("p1", "ref1")], &cancel)
            .await;
        assert_eq!(result.status, ListingStatus::Failed);
        assert!(result.errors[0].contains("cancelled"));
        assert_eq!(p.progress().phase, PipelinePhase::Failed);
    }
}
