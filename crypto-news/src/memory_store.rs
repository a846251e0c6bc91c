use crate::traits::{Clock, SystemClock};
use crate::utils::url::normalize_url;
use async_trait::async_trait;
use interfaces::{
    ArticleFilter, ArticleQuery, ArticleStore, NewArticle, PersistedArticle, QueryResult, SortOrder,
    StoreError, StoreResult,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process `ArticleStore`. URLs are unique after normalization.
///
/// Used when no database is configured and by tests; `set_available(false)`
/// makes every call fail as an unreachable datastore would.
pub struct MemoryArticleStore {
    articles: RwLock<Vec<PersistedArticle>>,
    available: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            clock,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    /// Copy of every stored article, in insertion order.
    pub async fn snapshot(&self) -> Vec<PersistedArticle> {
        self.articles.read().await.clone()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn insert_batch(&self, articles: Vec<NewArticle>) -> StoreResult<Vec<PersistedArticle>> {
        self.check_available()?;
        let now = self.clock.now();

        // Check and insert under one write lock so racing batches can't both insert a URL.
        let mut stored = self.articles.write().await;
        let mut urls: HashSet<String> = stored.iter().map(|a| normalize_url(&a.url)).collect();
        let mut inserted = Vec::new();

        for article in articles {
            if !urls.insert(normalize_url(&article.url)) {
                continue;
            }
            let persisted = PersistedArticle::from_new(article, now);
            stored.push(persisted.clone());
            inserted.push(persisted);
        }

        Ok(inserted)
    }

    async fn query_articles(&self, query: &ArticleQuery) -> StoreResult<QueryResult> {
        self.check_available()?;
        let stored = self.articles.read().await;

        let mut matches: Vec<&PersistedArticle> =
            stored.iter().filter(|a| query.filter.matches(a)).collect();
        let total_count = matches.len();

        // Stable sort keeps insertion order among equal timestamps.
        match query.sort {
            SortOrder::Newest => matches.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            SortOrder::Oldest => matches.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
        }

        let items = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(QueryResult { items, total_count })
    }

    async fn delete_by_filter(&self, filter: &ArticleFilter) -> StoreResult<u64> {
        self.check_available()?;
        let mut stored = self.articles.write().await;
        let before = stored.len();
        stored.retain(|a| !filter.matches(a));
        Ok((before - stored.len()) as u64)
    }

    async fn update_cover_image(&self, id: Uuid, cover_image_url: &str) -> StoreResult<bool> {
        self.check_available()?;
        let mut stored = self.articles.write().await;
        match stored.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.cover_image_url = Some(cover_image_url.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
