//! Listing Analyzer
//!
//! Stage wrapper around the vision backend. Photos are analyzed
//! sequentially (the stage contract is whole-listing input for the locker),
//! per-photo failures become degraded analyses instead of aborting the run.

use std::sync::Arc;

use tracing::{debug, warn};

use listinglens_core::{
    PhotoAnalysis, PhotoAnalyzerBackend, PhotoRef, PipelinePhase, ProgressEvent, ProgressTracker,
};

/// Progress band reserved for the analysis stage.
const ANALYZE_BAND: u8 = 25;

/// Runs the analysis stage for one listing.
pub struct ListingAnalyzer {
    backend: Arc<dyn PhotoAnalyzerBackend>,
}

impl ListingAnalyzer {
    pub fn new(backend: Arc<dyn PhotoAnalyzerBackend>) -> Self {
        Self { backend }
    }

    /// Analyze every photo in order, emitting per-photo progress.
    ///
    /// A photo the backend cannot classify is carried forward as
    /// `PhotoAnalysis::degraded` so the planner can still hand it a minimal
    /// tool set; the output always has one entry per input photo.
    pub async fn analyze_all(
        &self,
        photos: &[PhotoRef],
        tracker: &ProgressTracker,
    ) -> Vec<PhotoAnalysis> {
        let total = photos.len();
        let mut analyses = Vec::with_capacity(total);

        for (index, photo) in photos.iter().enumerate() {
            let analysis = match self.backend.analyze(photo).await {
                Ok(analysis) => {
                    debug!(photo_id = %photo.id, hero_score = analysis.hero_score, "photo analyzed");
                    analysis
                }
                Err(e) => {
                    warn!(photo_id = %photo.id, error = %e, "analysis failed, carrying degraded record");
                    PhotoAnalysis::degraded(&photo.id)
                }
            };
            analyses.push(analysis);

            let done = index + 1;
            let progress = ((done * ANALYZE_BAND as usize) / total) as u8;
            tracker.emit(
                ProgressEvent::new(
                    PipelinePhase::Analyzing,
                    progress,
                    format!("Analyzed photo {} of {}", done, total),
                )
                .with_photos(done, total),
            );
        }

        analyses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use listinglens_core::{CoreResult, NullProgressSink, PipelineError};

    struct FlakyBackend;

    #[async_trait]
    impl PhotoAnalyzerBackend for FlakyBackend {
        async fn analyze(&self, photo: &PhotoRef) -> CoreResult<PhotoAnalysis> {
            if photo.id == "bad" {
                return Err(PipelineError::analysis(&photo.id, "unreadable"));
            }
            let mut analysis = PhotoAnalysis::degraded(&photo.id);
            analysis.analysis_confidence = 90;
            analysis.hero_score = 50;
            Ok(analysis)
        }
    }

    #[tokio::test]
    async fn test_failed_photo_becomes_degraded_not_fatal() {
        let analyzer = ListingAnalyzer::new(Arc::new(FlakyBackend));
        let tracker = ProgressTracker::new(Arc::new(NullProgressSink));
        let photos = vec![
            PhotoRef::new("p1", "ref1"),
            PhotoRef::new("bad", "ref2"),
            PhotoRef::new("p3", "ref3"),
        ];

        let analyses = analyzer.analyze_all(&photos, &tracker).await;
        assert_eq!(analyses.len(), 3);
        assert!(!analyses[0].is_degraded());
        assert!(analyses[1].is_degraded());
        assert!(!analyses[2].is_degraded());
    }

    #[tokio::test]
    async fn test_progress_reaches_band_end() {
        let analyzer = ListingAnalyzer::new(Arc::new(FlakyBackend));
        let tracker = ProgressTracker::new(Arc::new(NullProgressSink));
        let photos = vec![PhotoRef::new("p1", "ref1"), PhotoRef::new("p2", "ref2")];

        analyzer.analyze_all(&photos, &tracker).await;
        let snap = tracker.snapshot();
        assert_eq!(snap.phase, PipelinePhase::Analyzing);
        assert_eq!(snap.progress, 25);
    }
}
