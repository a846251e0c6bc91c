use crate::cache::QueryCache;
use crate::config::RetentionConfig;
use crate::traits::Clock;
use crate::types::{ArticlePage, Result};
use chrono::{DateTime, Duration, Utc};
use interfaces::{ArticleFilter, ArticleQuery, ArticleStore, SortOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapEviction {
    pub name: String,
    pub limit: usize,
    pub removed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub expired: u64,
    pub evictions: Vec<CapEviction>,
}

impl SweepReport {
    pub fn total_removed(&self) -> u64 {
        self.expired + self.evictions.iter().map(|e| e.removed).sum::<u64>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub name: String,
    pub count: usize,
    pub limit: usize,
}

/// Retention purge and per-category caps over the persisted set.
pub struct LifecycleManager {
    store: Arc<dyn ArticleStore>,
    config: RetentionConfig,
    clock: Arc<dyn Clock>,
    cache: Arc<QueryCache<ArticlePage>>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        config: RetentionConfig,
        clock: Arc<dyn Clock>,
        cache: Arc<QueryCache<ArticlePage>>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            cache,
        }
    }

    /// Oldest `published_at` still inside the retention window.
    pub fn retention_cutoff(&self) -> DateTime<Utc> {
        self.clock.now() - Duration::hours(self.config.retention_hours)
    }

    /// Purge expired articles, then trim every over-cap category oldest first.
    /// Caps are applied in configuration order and may overlap.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        let cutoff = self.retention_cutoff();
        report.expired = self
            .store
            .delete_by_filter(&ArticleFilter::all().published_before(cutoff))
            .await?;
        if report.expired > 0 {
            self.cache.invalidate_all().await;
            info!(expired = report.expired, %cutoff, "Purged articles past retention");
        }

        for limit in &self.config.limits {
            let filter = limit.scope.filter();
            let count = self
                .store
                .query_articles(&ArticleQuery::count_only(filter.clone()))
                .await?
                .total_count;
            if count <= limit.max {
                debug!(cap = %limit.name, count, max = limit.max, "Within cap");
                continue;
            }

            let excess = count - limit.max;
            let oldest = self
                .store
                .query_articles(&ArticleQuery::new(filter).sort(SortOrder::Oldest).page(0, excess))
                .await?;
            let ids = oldest.items.iter().map(|article| article.id).collect();
            let removed = self.store.delete_by_filter(&ArticleFilter::all().ids(ids)).await?;
            if removed > 0 {
                self.cache.invalidate_all().await;
            }

            info!(cap = %limit.name, count, max = limit.max, removed, "Evicted oldest articles over cap");
            report.evictions.push(CapEviction {
                name: limit.name.clone(),
                limit: limit.max,
                removed,
            });
        }

        Ok(report)
    }

    /// Live count of every configured category next to its cap.
    pub async fn category_status(&self) -> Result<Vec<CategoryStatus>> {
        let mut statuses = Vec::with_capacity(self.config.limits.len());
        for limit in &self.config.limits {
            let count = self
                .store
                .query_articles(&ArticleQuery::count_only(limit.scope.filter()))
                .await?
                .total_count;
            statuses.push(CategoryStatus {
                name: limit.name.clone(),
                count,
                limit: limit.max,
            });
        }
        Ok(statuses)
    }
}
