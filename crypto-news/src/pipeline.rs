use crate::classifier::NetworkClassifier;
use crate::dedup::{DedupOutcome, Deduplicator};
use crate::traits::{Clock, FeedSource};
use crate::types::{CandidateArticle, RawItem};
use crate::validator::ContentValidator;
use futures::future::join_all;
use interfaces::PersistedArticle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Target for rejection audit records.
pub const AUDIT_TARGET: &str = "crypto_news::audit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub items: Vec<RawItem>,
    pub failed_sources: Vec<SourceFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluatedBatch {
    /// Validated and classified, newest first.
    pub accepted: Vec<CandidateArticle>,
    pub rejected: usize,
}

/// Fetch, validate, classify and deduplicate. Holds no persistent state, so
/// several passes may run at once.
pub struct IngestionPipeline {
    sources: Vec<Arc<dyn FeedSource>>,
    validator: ContentValidator,
    classifier: NetworkClassifier,
    deduplicator: Deduplicator,
    clock: Arc<dyn Clock>,
    source_timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(
        sources: Vec<Arc<dyn FeedSource>>,
        validator: ContentValidator,
        classifier: NetworkClassifier,
        deduplicator: Deduplicator,
        clock: Arc<dyn Clock>,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            validator,
            classifier,
            deduplicator,
            clock,
            source_timeout,
        }
    }

    /// Pull every source concurrently. A source that errors or exceeds the
    /// timeout contributes no items and is reported in `failed_sources`.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let pulls = self.sources.iter().map(|source| {
            let source = source.clone();
            let timeout = self.source_timeout;
            async move {
                let result = tokio::time::timeout(timeout, source.pull()).await;
                (source, result)
            }
        });

        let mut outcome = FetchOutcome::default();
        for (source, result) in join_all(pulls).await {
            let error = match result {
                Ok(Ok(items)) => {
                    debug!(source = source.name(), count = items.len(), "Source pulled");
                    outcome.items.extend(items);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}s", self.source_timeout.as_secs()),
            };
            warn!(source = source.name(), url = source.feed_url(), %error, "Skipping source");
            outcome.failed_sources.push(SourceFailure {
                source: source.name().to_string(),
                error,
            });
        }

        outcome
    }

    /// Validate and classify raw items. Every rejection is written to the
    /// audit target.
    pub fn evaluate(&self, items: Vec<RawItem>) -> EvaluatedBatch {
        let now = self.clock.now();
        let mut batch = EvaluatedBatch::default();

        for item in items {
            let verdict = self
                .validator
                .validate_via(&item.title, &item.summary, &item.source, item.via_aggregator());
            if !verdict.is_valid {
                info!(
                    target: AUDIT_TARGET,
                    title = %item.title,
                    source = %item.source,
                    url = %item.link,
                    reason = %verdict.reason,
                    confidence = verdict.confidence,
                    "Rejected item"
                );
                batch.rejected += 1;
                continue;
            }

            let classification = self
                .classifier
                .classify(&item.title, &item.summary, item.published_at, now);
            batch.accepted.push(CandidateArticle::new(item, &verdict, classification));
        }

        batch
            .accepted
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));
        batch
    }

    pub fn dedupe(&self, existing: &[PersistedArticle], candidates: Vec<CandidateArticle>) -> DedupOutcome {
        self.deduplicator.dedupe_against(existing, candidates)
    }
}
