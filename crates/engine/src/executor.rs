//! Batch Executor
//!
//! Runs a built strategy against the providers. Photos run concurrently
//! under a semaphore bound; each photo's own tool chain is strictly
//! sequential (tool n's output feeds tool n+1). All remote calls pass
//! through the shared rate limiter and a per-call timeout, and failures
//! are photo-scoped: one photo failing never blocks its siblings.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use listinglens_core::{
    AppliedTool, ExecutorConfig, InvokeRequest, ListingStrategy, PhotoProcessingResult,
    PhotoStrategy, PipelineError, PipelinePhase, ProgressEvent, ProgressTracker, ProviderError,
    ToolParams,
};
use listinglens_providers::{ProviderId, ProviderRouter, RateLimiter};

use crate::pipeline::{self, ToolStep};

/// Progress band reserved for the processing stage.
const PROCESS_BAND_START: u8 = 40;
const PROCESS_BAND_WIDTH: usize = 50;

/// Executes listing strategies with bounded concurrency.
pub struct BatchExecutor {
    router: Arc<ProviderRouter>,
    rate_limiter: Arc<RateLimiter>,
    config: ExecutorConfig,
}

impl BatchExecutor {
    pub fn new(
        router: Arc<ProviderRouter>,
        rate_limiter: Arc<RateLimiter>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            router,
            rate_limiter,
            config,
        }
    }

    /// Run every photo strategy, returning one result per photo in strategy
    /// order. Never returns an error: failures are recorded per photo.
    pub async fn execute(
        &self,
        strategy: &ListingStrategy,
        photo_refs: &BTreeMap<String, String>,
        tracker: &ProgressTracker,
        cancel: &CancellationToken,
    ) -> Vec<PhotoProcessingResult> {
        let total = strategy.photos.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        info!(
            listing_id = %strategy.listing_id,
            photos = total,
            concurrency = self.config.concurrency,
            "executing strategy"
        );

        let mut handles = Vec::with_capacity(total);
        for photo in &strategy.photos {
            let semaphore = semaphore.clone();
            let router = self.router.clone();
            let limiter = self.rate_limiter.clone();
            let config = self.config.clone();
            let cancel = cancel.clone();
            let photo = photo.clone();
            let input_ref = photo_refs.get(&photo.photo_id).cloned();

            let photo_id = photo.photo_id.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return PhotoProcessingResult::failed(
                            &photo.photo_id,
                            "executor shut down before photo started",
                        )
                    }
                };
                process_photo(photo, input_ref, router, limiter, config, cancel).await
            });
            handles.push((photo_id, handle));
        }

        let mut results = Vec::with_capacity(total);
        for (done, (photo_id, handle)) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(photo_id = %photo_id, error = %e, "photo task panicked");
                    PhotoProcessingResult::failed(&photo_id, format!("photo task failed: {}", e))
                }
            };
            let completed = done + 1;
            let progress =
                PROCESS_BAND_START + ((completed * PROCESS_BAND_WIDTH) / total.max(1)) as u8;
            tracker.emit(
                ProgressEvent::new(
                    PipelinePhase::Processing,
                    progress,
                    format!("Processed photo {} of {}", completed, total),
                )
                .with_photos(completed, total),
            );
            results.push(result);
        }
        results
    }
}

/// Run one photo's decisions in order. Cancellation is checked between
/// tools only; an in-flight provider call is allowed to finish rather than
/// be cut mid-call.
async fn process_photo(
    photo: PhotoStrategy,
    input_ref: Option<String>,
    router: Arc<ProviderRouter>,
    limiter: Arc<RateLimiter>,
    config: ExecutorConfig,
    cancel: CancellationToken,
) -> PhotoProcessingResult {
    let started_at = Utc::now().timestamp_millis();
    let clock = Instant::now();

    let Some(mut current_ref) = input_ref else {
        return PhotoProcessingResult::failed(&photo.photo_id, "no storage reference for photo")
            .with_timing(started_at, 0);
    };

    let mut applied: Vec<AppliedTool> = Vec::new();
    let mut fallbacks: Vec<String> = Vec::new();
    let mut cost_cents = 0u32;

    for decision in &photo.decisions {
        if cancel.is_cancelled() {
            warn!(photo_id = %photo.photo_id, "photo abandoned, run cancelled");
            return PhotoProcessingResult::failed(
                &photo.photo_id,
                PipelineError::Cancelled.to_string(),
            )
            .with_fallbacks(fallbacks)
            .with_cost(cost_cents)
            .with_timing(started_at, clock.elapsed().as_millis() as u64);
        }

        for step in pipeline::expand(decision) {
            match invoke_step(&step, &current_ref, &router, &limiter, &config).await {
                Ok((out_ref, step_cost)) => {
                    current_ref = out_ref;
                    cost_cents += step_cost;
                }
                Err(e) if step.optional => {
                    warn!(
                        photo_id = %photo.photo_id,
                        step = step.label,
                        error = %e,
                        "optional pass failed, keeping previous result"
                    );
                    fallbacks.push(step.label.to_string());
                }
                Err(e) => {
                    warn!(photo_id = %photo.photo_id, tool = %decision.tool, error = %e, "photo failed");
                    return PhotoProcessingResult::failed(
                        &photo.photo_id,
                        format!("{} failed: {}", decision.tool, e),
                    )
                    .with_fallbacks(fallbacks)
                    .with_cost(cost_cents)
                    .with_timing(started_at, clock.elapsed().as_millis() as u64);
                }
            }
        }

        applied.push(AppliedTool {
            tool: decision.tool,
            preset: decision.preset,
        });
    }

    debug!(photo_id = %photo.photo_id, tools = applied.len(), "photo complete");
    PhotoProcessingResult::succeeded(&photo.photo_id, current_ref, applied)
        .with_fallbacks(fallbacks)
        .with_cost(cost_cents)
        .with_timing(started_at, clock.elapsed().as_millis() as u64)
}

/// One step invocation with pacing, timeout, and bounded rate-limit retry.
/// Only `RateLimited` is retried; every other provider error surfaces to
/// the caller's fallback rules.
async fn invoke_step(
    step: &ToolStep,
    input_ref: &str,
    router: &ProviderRouter,
    limiter: &RateLimiter,
    config: &ExecutorConfig,
) -> Result<(String, u32), ProviderError> {
    let route = router
        .resolve(step.tool)
        .map_err(|e| ProviderError::unavailable(e.to_string()))?;

    let mut attempt = 0u32;
    loop {
        // The in-process backend does not consume remote quota.
        if route.provider_id != ProviderId::Local {
            limiter.acquire().await;
        }

        let request = InvokeRequest {
            tool: step.tool,
            image_ref: input_ref.to_string(),
            params: ToolParams::new(step.preset, step.strength),
        };
        debug!(tool = %step.tool, provider = %route.provider_id, step = step.label, attempt, "invoking provider");

        let outcome = match tokio::time::timeout(config.call_timeout, route.provider.invoke(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(config.call_timeout)),
        };

        match outcome {
            Ok(out_ref) => return Ok((out_ref, route.estimated_cost_cents)),
            Err(e) if e.is_retryable() && attempt < config.max_rate_limit_retries => {
                let wait = match &e {
                    ProviderError::RateLimited {
                        retry_after: Some(hint),
                        ..
                    } => *hint,
                    _ => config.retry_backoff_base * 2u32.saturating_pow(attempt),
                };
                warn!(
                    tool = %step.tool,
                    attempt,
                    wait_secs = wait.as_secs(),
                    "rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use listinglens_core::{
        CapsUsage, EnhancementDecision, EnhancementProvider, ListingCaps, LockedPresets,
        NullProgressSink, PhotoRole, Priority, ProviderResult, ToolId,
    };

    /// Provider that appends the tool name to the ref; fails according to
    /// the configured mode.
    struct ScriptedProvider {
        calls: Arc<AtomicUsize>,
        mode: FailMode,
    }

    #[derive(Clone, Copy)]
    enum FailMode {
        Never,
        /// Fail any request whose input ref contains "bad"
        BadRefs,
        /// Fail low-strength passes (the refinement pass)
        Refinements,
        AlwaysRateLimited,
    }

    #[async_trait]
    impl EnhancementProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn supports(&self, _tool: ToolId) -> bool {
            true
        }
        async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                FailMode::Never => {}
                FailMode::BadRefs => {
                    if request.image_ref.contains("bad") {
                        return Err(ProviderError::unavailable("backend down"));
                    }
                }
                FailMode::Refinements => {
                    if request.params.strength < 0.5 {
                        return Err(ProviderError::unavailable("refinement rejected"));
                    }
                }
                FailMode::AlwaysRateLimited => {
                    return Err(ProviderError::rate_limited("slow down"));
                }
            }
            Ok(format!("{}+{:?}", request.image_ref, request.tool))
        }
        async fn health_check(&self) -> ProviderResult<()> {
            Ok(())
        }
    }

    fn executor_with(mode: FailMode) -> (BatchExecutor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider {
            calls: calls.clone(),
            mode,
        });
        let mut router = ProviderRouter::new();
        router.register(ProviderId::Skylab, provider.clone());
        router.register(ProviderId::Staged, provider.clone());
        router.register(ProviderId::Local, provider);

        let executor = BatchExecutor::new(
            Arc::new(router),
            Arc::new(RateLimiter::new(Duration::ZERO)),
            ExecutorConfig::default()
                .with_min_call_interval(Duration::ZERO)
                .with_call_timeout(Duration::from_secs(5)),
        );
        (executor, calls)
    }

    fn decision(tool: ToolId) -> EnhancementDecision {
        EnhancementDecision {
            tool,
            preset: None,
            reason: "test".to_string(),
            priority: Priority::High,
        }
    }

    fn strategy(photos: Vec<PhotoStrategy>) -> ListingStrategy {
        let hero = photos[0].photo_id.clone();
        ListingStrategy {
            listing_id: "l1".to_string(),
            photos,
            locked_presets: LockedPresets::default(),
            caps: ListingCaps::for_listing(4),
            caps_usage: CapsUsage::new(),
            skipped: Vec::new(),
            hero_photo_id: hero,
            twilight_photo_id: None,
            confidence_score: 90,
        }
    }

    fn photo(id: &str, decisions: Vec<EnhancementDecision>) -> PhotoStrategy {
        PhotoStrategy {
            photo_id: id.to_string(),
            role: PhotoRole::Supporting,
            decisions,
            confidence: 90,
        }
    }

    fn refs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(id, r)| (id.to_string(), r.to_string()))
            .collect()
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(NullProgressSink))
    }

    #[tokio::test]
    async fn test_single_photo_failure_is_isolated() {
        let (executor, _) = executor_with(FailMode::BadRefs);
        let strategy = strategy(vec![
            photo("p1", vec![decision(ToolId::SkyReplacement)]),
            photo("p2", vec![decision(ToolId::SkyReplacement)]),
            photo("p3", vec![decision(ToolId::SkyReplacement)]),
        ]);
        let refs = refs(&[("p1", "ok1"), ("p2", "bad2"), ("p3", "ok3")]);

        let results = executor
            .execute(&strategy, &refs, &tracker(), &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().contains("backend down"));
        assert!(results[2].success);
    }

    #[tokio::test]
    async fn test_optional_refinement_falls_back_to_base_pass() {
        let (executor, calls) = executor_with(FailMode::Refinements);
        let strategy = strategy(vec![photo(
            "p1",
            vec![decision(ToolId::TwilightConversion)],
        )]);
        let refs = refs(&[("p1", "in1")]);

        let results = executor
            .execute(&strategy, &refs, &tracker(), &CancellationToken::new())
            .await;

        assert!(results[0].success);
        assert_eq!(results[0].fallbacks, vec!["window-glow".to_string()]);
        // Final ref is the base pass output, transformed exactly once
        assert_eq!(
            results[0].final_ref.as_deref(),
            Some("in1+TwilightConversion")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_are_bounded() {
        let (executor, calls) = executor_with(FailMode::AlwaysRateLimited);
        let strategy = strategy(vec![photo("p1", vec![decision(ToolId::SkyReplacement)])]);
        let refs = refs(&[("p1", "in1")]);

        let results = executor
            .execute(&strategy, &refs, &tracker(), &CancellationToken::new())
            .await;

        assert!(!results[0].success);
        // Initial attempt plus max_rate_limit_retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_storage_ref_fails_photo() {
        let (executor, calls) = executor_with(FailMode::Never);
        let strategy = strategy(vec![photo("p1", vec![decision(ToolId::HdrBoost)])]);
        let refs = BTreeMap::new();

        let results = executor
            .execute(&strategy, &refs, &tracker(), &CancellationToken::new())
            .await;

        assert!(!results[0].success);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tools_chain_and_costs_accumulate() {
        let (executor, _) = executor_with(FailMode::Never);
        let strategy = strategy(vec![photo(
            "p1",
            vec![
                decision(ToolId::Declutter),
                decision(ToolId::SkyReplacement),
            ],
        )]);
        let refs = refs(&[("p1", "in1")]);

        let results = executor
            .execute(&strategy, &refs, &tracker(), &CancellationToken::new())
            .await;

        let result = &results[0];
        assert!(result.success);
        assert_eq!(
            result.final_ref.as_deref(),
            Some("in1+Declutter+SkyReplacement")
        );
        assert_eq!(result.applied.len(), 2);
        // Declutter 60 + sky 60 from the router estimate table
        assert_eq!(result.cost_cents, 120);
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_tools() {
        let (executor, _) = executor_with(FailMode::Never);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let strategy = strategy(vec![photo("p1", vec![decision(ToolId::HdrBoost)])]);
        let refs = refs(&[("p1", "in1")]);

        let results = executor.execute(&strategy, &refs, &tracker(), &cancel).await;
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("cancelled"));
    }
}
