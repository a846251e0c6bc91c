use crate::cache::QueryCache;
use crate::classifier::NetworkClassifier;
use crate::config::{CacheConfig, NewsConfig};
use crate::dedup::{DedupOutcome, Deduplicator};
use crate::fetcher::Fetcher;
use crate::lifecycle::{CategoryStatus, LifecycleManager, SweepReport};
use crate::pipeline::{IngestionPipeline, SourceFailure};
use crate::sources;
use crate::traits::{Clock, FeedSource, SystemClock};
use crate::types::{ArticlePage, NewsError, Pagination, Result};
use crate::validator::ContentValidator;
use chrono::Duration;
use interfaces::{ArticleFilter, ArticleQuery, ArticleStore, Category, PersistedArticle, SortOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Prefix shared by every read-path cache key.
pub const ARTICLES_KEY_PREFIX: &str = "articles:";

/// Read-path options. Fields left `None` don't filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleOptions {
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    /// 0 means the configured default page size.
    pub limit: usize,
    pub network: Option<String>,
    pub category: Option<Category>,
    pub breaking: Option<bool>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl ArticleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = Some(breaking);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Clamp paging and drop empty text filters.
    pub fn normalized(&self, config: &CacheConfig) -> Self {
        let limit = match self.limit {
            0 => config.default_page_size,
            limit => limit.min(config.max_page_size),
        };
        let clean = |value: &Option<String>| {
            value
                .as_ref()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            page: self.page.max(1),
            limit,
            network: clean(&self.network),
            category: self.category,
            breaking: self.breaking,
            search: clean(&self.search),
            sort: self.sort,
        }
    }

    /// Canonical key: equal options always give equal keys, whatever the
    /// case of the text filters.
    pub fn cache_key(&self) -> String {
        fn or_any(value: Option<String>) -> String {
            value.unwrap_or_else(|| "*".to_string())
        }

        format!(
            "{}page={}:limit={}:network={}:category={}:breaking={}:sort={}:search={}",
            ARTICLES_KEY_PREFIX,
            self.page,
            self.limit,
            or_any(self.network.as_ref().map(|n| n.to_lowercase())),
            or_any(self.category.map(|c| c.as_str().to_string())),
            or_any(self.breaking.map(|b| b.to_string())),
            self.sort.as_str(),
            or_any(self.search.as_ref().map(|s| s.to_lowercase())),
        )
    }

    pub fn to_query(&self) -> ArticleQuery {
        let mut filter = ArticleFilter::all();
        if let Some(network) = &self.network {
            filter = filter.network(network.clone());
        }
        if let Some(category) = self.category {
            filter = filter.category(category);
        }
        if let Some(breaking) = self.breaking {
            filter = filter.breaking(breaking);
        }
        if let Some(search) = &self.search {
            filter = filter.search(search.clone());
        }

        ArticleQuery::new(filter)
            .sort(self.sort)
            .page(self.page.saturating_sub(1) * self.limit, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub data: Vec<PersistedArticle>,
    pub pagination: Pagination,
    pub cached: bool,
    pub cache_age_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub fetched: usize,
    pub validated: usize,
    pub rejected: usize,
    /// Accepted items already older than the retention window.
    pub stale: usize,
    pub duplicates: usize,
    pub inserted: usize,
    pub failed_sources: Vec<SourceFailure>,
    pub duration_ms: u64,
}

/// Entry point for the scheduler, the read path and administrative calls.
pub struct NewsService {
    pipeline: IngestionPipeline,
    store: Arc<dyn ArticleStore>,
    cache: Arc<QueryCache<ArticlePage>>,
    lifecycle: LifecycleManager,
    cache_config: CacheConfig,
}

impl NewsService {
    pub fn builder(config: NewsConfig) -> NewsServiceBuilder {
        NewsServiceBuilder::new(config)
    }

    /// One fetch, validate, classify, dedupe and insert cycle.
    ///
    /// Datastore failures abort the pass and leave the cache untouched.
    pub async fn run_ingestion_pass(&self) -> Result<IngestionReport> {
        let started = Instant::now();
        let mut report = IngestionReport::default();

        let fetched = self.pipeline.fetch_all().await;
        report.fetched = fetched.items.len();
        report.failed_sources = fetched.failed_sources;

        let batch = self.pipeline.evaluate(fetched.items);
        report.validated = batch.accepted.len();
        report.rejected = batch.rejected;

        // Nothing older than the retention window reaches the store.
        let cutoff = self.lifecycle.retention_cutoff();
        let (fresh, stale): (Vec<_>, Vec<_>) = batch
            .accepted
            .into_iter()
            .partition(|candidate| candidate.published_at >= cutoff);
        report.stale = stale.len();
        if !stale.is_empty() {
            debug!(stale = report.stale, %cutoff, "Skipping items past retention");
        }

        let existing = self
            .store
            .query_articles(&ArticleQuery::new(ArticleFilter::all().published_after(cutoff)))
            .await
            .map_err(|e| {
                error!("Failed to load persisted articles for dedup: {}", e);
                e
            })?;

        let DedupOutcome { unique, duplicates } = self.pipeline.dedupe(&existing.items, fresh);
        report.duplicates = duplicates.len();

        if !unique.is_empty() {
            let articles = unique.into_iter().map(|c| c.into_new_article()).collect();
            let inserted = self.store.insert_batch(articles).await.map_err(|e| {
                error!("Failed to insert article batch: {}", e);
                e
            })?;
            report.inserted = inserted.len();
        }

        if report.inserted > 0 {
            self.cache.invalidate_all().await;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            fetched = report.fetched,
            validated = report.validated,
            rejected = report.rejected,
            stale = report.stale,
            duplicates = report.duplicates,
            inserted = report.inserted,
            failed_sources = report.failed_sources.len(),
            duration_ms = report.duration_ms,
            "Ingestion pass complete"
        );
        Ok(report)
    }

    /// Cache-fronted read.
    pub async fn get_articles(&self, options: &ArticleOptions) -> Result<ArticlesResponse> {
        let options = options.normalized(&self.cache_config);
        let key = options.cache_key();

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(ArticlesResponse {
                data: hit.value.data,
                pagination: hit.value.pagination,
                cached: true,
                cache_age_minutes: hit.age.num_minutes(),
            });
        }

        // Taken before the query: an invalidation while it runs makes the page stale.
        let generation = self.cache.generation();
        let result = self.store.query_articles(&options.to_query()).await?;
        let page = ArticlePage {
            pagination: Pagination::new(options.page, options.limit, result.total_count),
            data: result.items,
        };
        if !self.cache.set_if_generation(key, page.clone(), generation).await {
            debug!("Not caching page read across an invalidation");
        }

        Ok(ArticlesResponse {
            data: page.data,
            pagination: page.pagination,
            cached: false,
            cache_age_minutes: 0,
        })
    }

    pub async fn run_purge(&self) -> Result<SweepReport> {
        self.lifecycle.sweep().await
    }

    pub async fn clear_cache(&self) -> usize {
        self.cache.invalidate_all().await
    }

    pub async fn category_report(&self) -> Result<Vec<CategoryStatus>> {
        self.lifecycle.category_status().await
    }

    /// Out-of-band cover image write. Returns `false` for unknown ids.
    pub async fn attach_cover_image(&self, id: Uuid, cover_image_url: &str) -> Result<bool> {
        let updated = self.store.update_cover_image(id, cover_image_url).await?;
        if updated {
            self.cache.invalidate_prefix(ARTICLES_KEY_PREFIX).await;
        }
        Ok(updated)
    }

    pub fn cache(&self) -> &Arc<QueryCache<ArticlePage>> {
        &self.cache
    }
}

pub struct NewsServiceBuilder {
    config: NewsConfig,
    store: Option<Arc<dyn ArticleStore>>,
    clock: Option<Arc<dyn Clock>>,
    sources: Option<Vec<Arc<dyn FeedSource>>>,
}

impl NewsServiceBuilder {
    pub fn new(config: NewsConfig) -> Self {
        Self {
            config,
            store: None,
            clock: None,
            sources: None,
        }
    }

    pub fn store(mut self, store: Arc<dyn ArticleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the configured HTTP sources.
    pub fn sources(mut self, sources: Vec<Arc<dyn FeedSource>>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn add_source(mut self, source: Arc<dyn FeedSource>) -> Self {
        self.sources.get_or_insert_with(Vec::new).push(source);
        self
    }

    pub fn build(self) -> Result<NewsService> {
        let config = self.config;
        config.validate()?;

        let store = self
            .store
            .ok_or_else(|| NewsError::Config("no article store configured".to_string()))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let sources = match self.sources {
            Some(sources) => sources,
            None => {
                let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
                sources::from_config(&config.sources, fetcher)
            }
        };
        info!(
            sources = sources.len(),
            dictionaries = %config.dictionaries.version,
            "Building news service"
        );

        let dictionaries = Arc::new(config.dictionaries.clone());
        let pipeline = IngestionPipeline::new(
            sources,
            ContentValidator::new(dictionaries.clone(), config.validation.clone()),
            NetworkClassifier::new(dictionaries, &config.classifier),
            Deduplicator::new(config.dedup.clone()),
            clock.clone(),
            std::time::Duration::from_secs(config.fetch.source_timeout_seconds),
        );
        let cache = Arc::new(QueryCache::new(
            Duration::seconds(config.cache.ttl_seconds),
            clock.clone(),
        ));
        let lifecycle = LifecycleManager::new(store.clone(), config.retention.clone(), clock, cache.clone());

        Ok(NewsService {
            pipeline,
            store,
            cache,
            lifecycle,
            cache_config: config.cache,
        })
    }
}
