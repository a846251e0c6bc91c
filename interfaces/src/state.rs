use crate::defs::{ArticleFilter, ArticleQuery, NewArticle, PersistedArticle, QueryResult};
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Datastore unavailable: {0}")]
    Unavailable(String),

    #[error("Article not found: {id}")]
    NotFound { id: Uuid },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The persistent article datastore.
///
/// Implementations must keep `url` unique among stored articles: inserting an
/// article whose URL is already present is a no-op, and such articles are not
/// part of the returned batch. Concurrent callers may race on the same URL;
/// exactly one of them observes the insert.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a batch and return only the articles that were actually stored.
    async fn insert_batch(&self, articles: Vec<NewArticle>) -> StoreResult<Vec<PersistedArticle>>;

    async fn query_articles(&self, query: &ArticleQuery) -> StoreResult<QueryResult>;

    /// Returns the number of deleted articles.
    async fn delete_by_filter(&self, filter: &ArticleFilter) -> StoreResult<u64>;

    /// Out-of-band write used by the image subsystem. Returns `false` if the
    /// article no longer exists.
    async fn update_cover_image(&self, id: Uuid, cover_image_url: &str) -> StoreResult<bool>;
}
