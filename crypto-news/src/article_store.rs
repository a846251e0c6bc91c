use crate::utils::url::normalize_url;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interfaces::{
    ArticleFilter, ArticleQuery, ArticleStore, Category, NewArticle, PersistedArticle, QueryResult,
    SortOrder, StoreError, StoreResult,
};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

const COLUMNS: &str = "id, title, summary, url, original_url, source, feed_source, feed_url, network, \
     category, is_breaking, confidence, via_aggregator, has_source_image, cover_image_url, \
     published_at, inserted_at";

/// `COLUMNS` plus the uniqueness key, which is written but never read back.
const INSERT_COLUMNS: &str = "id, url_key, title, summary, url, original_url, source, feed_source, \
     feed_url, network, category, is_breaking, confidence, via_aggregator, has_source_image, \
     cover_image_url, published_at, inserted_at";

/// Rows per INSERT statement; keeps bind parameters well under the protocol limit.
const INSERT_CHUNK: usize = 500;

fn db_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

/// Uniqueness key for a stored URL: query-string and fragment variants of
/// one article share a key, matching the in-memory store.
pub fn url_key(url: &str) -> String {
    normalize_url(url)
}

/// One multi-row INSERT that skips rows whose `url_key` is already stored.
pub fn insert_statement(articles: &[NewArticle], now: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("INSERT INTO articles ({}) ", INSERT_COLUMNS));
    builder.push_values(articles, |mut row, article| {
        row.push_bind(Uuid::new_v4())
            .push_bind(url_key(&article.url))
            .push_bind(article.title.clone())
            .push_bind(article.summary.clone())
            .push_bind(article.url.clone())
            .push_bind(article.original_url.clone())
            .push_bind(article.source.clone())
            .push_bind(article.feed_source.clone())
            .push_bind(article.feed_url.clone())
            .push_bind(article.network.clone())
            .push_bind(article.category.as_str())
            .push_bind(article.is_breaking)
            .push_bind(article.confidence)
            .push_bind(article.via_aggregator)
            .push_bind(article.has_source_image)
            .push_bind(Option::<String>::None)
            .push_bind(article.published_at)
            .push_bind(now);
    });
    builder.push(format!(" ON CONFLICT (url_key) DO NOTHING RETURNING {}", COLUMNS));
    builder
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `ArticleStore` backed by a PostgreSQL `articles` table.
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await.map_err(db_error)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the articles table and its indexes if they don't exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                url_key TEXT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                original_url TEXT NOT NULL,
                source TEXT NOT NULL,
                feed_source TEXT NOT NULL,
                feed_url TEXT NOT NULL,
                network TEXT NOT NULL,
                category TEXT NOT NULL,
                is_breaking BOOLEAN NOT NULL DEFAULT FALSE,
                confidence DOUBLE PRECISION NOT NULL,
                via_aggregator BOOLEAN NOT NULL DEFAULT FALSE,
                has_source_image BOOLEAN NOT NULL DEFAULT FALSE,
                cover_image_url TEXT,
                published_at TIMESTAMP WITH TIME ZONE NOT NULL,
                inserted_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_articles_network ON articles (LOWER(network))",
            "CREATE INDEX IF NOT EXISTS idx_articles_breaking ON articles (is_breaking) WHERE is_breaking",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }

        info!("Article schema ready");
        Ok(())
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
        builder.push(" WHERE TRUE");
        if let Some(networks) = &filter.networks {
            let lowered: Vec<String> = networks.iter().map(|n| n.to_lowercase()).collect();
            builder.push(" AND LOWER(network) = ANY(").push_bind(lowered).push(")");
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(breaking) = filter.breaking {
            builder.push(" AND is_breaking = ").push_bind(breaking);
        }
        if let Some(term) = &filter.search {
            let pattern = format!("%{}%", escape_like(term));
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR summary ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(cutoff) = filter.published_before {
            builder.push(" AND published_at < ").push_bind(cutoff);
        }
        if let Some(cutoff) = filter.published_after {
            builder.push(" AND published_at >= ").push_bind(cutoff);
        }
        if let Some(ids) = &filter.ids {
            builder.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
        }
    }

    fn row_to_article(row: &PgRow) -> StoreResult<PersistedArticle> {
        let category: String = row.try_get("category").map_err(db_error)?;
        let category = category
            .parse::<Category>()
            .map_err(StoreError::Database)?;
        let published_at: DateTime<Utc> = row.try_get("published_at").map_err(db_error)?;
        let inserted_at: DateTime<Utc> = row.try_get("inserted_at").map_err(db_error)?;

        Ok(PersistedArticle {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get("title").map_err(db_error)?,
            summary: row.try_get("summary").map_err(db_error)?,
            url: row.try_get("url").map_err(db_error)?,
            original_url: row.try_get("original_url").map_err(db_error)?,
            source: row.try_get("source").map_err(db_error)?,
            feed_source: row.try_get("feed_source").map_err(db_error)?,
            feed_url: row.try_get("feed_url").map_err(db_error)?,
            network: row.try_get("network").map_err(db_error)?,
            category,
            is_breaking: row.try_get("is_breaking").map_err(db_error)?,
            confidence: row.try_get("confidence").map_err(db_error)?,
            via_aggregator: row.try_get("via_aggregator").map_err(db_error)?,
            has_source_image: row.try_get("has_source_image").map_err(db_error)?,
            cover_image_url: row.try_get("cover_image_url").map_err(db_error)?,
            published_at,
            inserted_at,
        })
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn insert_batch(&self, articles: Vec<NewArticle>) -> StoreResult<Vec<PersistedArticle>> {
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(articles.len());

        for chunk in articles.chunks(INSERT_CHUNK) {
            let mut builder = insert_statement(chunk, now);
            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
            for row in &rows {
                inserted.push(Self::row_to_article(row)?);
            }
        }

        debug!(offered = articles.len(), inserted = inserted.len(), "Inserted article batch");
        Ok(inserted)
    }

    async fn query_articles(&self, query: &ArticleQuery) -> StoreResult<QueryResult> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        Self::push_filter(&mut count, &query.filter);
        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(db_error)?;
        let total_count = total.max(0) as usize;

        if query.limit == Some(0) {
            return Ok(QueryResult {
                items: Vec::new(),
                total_count,
            });
        }

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {} FROM articles", COLUMNS));
        Self::push_filter(&mut select, &query.filter);
        select.push(match query.sort {
            SortOrder::Newest => " ORDER BY published_at DESC, inserted_at DESC, id",
            SortOrder::Oldest => " ORDER BY published_at ASC, inserted_at ASC, id",
        });
        if let Some(limit) = query.limit {
            select.push(" LIMIT ").push_bind(limit as i64);
        }
        select.push(" OFFSET ").push_bind(query.offset as i64);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = rows
            .iter()
            .map(Self::row_to_article)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(QueryResult { items, total_count })
    }

    async fn delete_by_filter(&self, filter: &ArticleFilter) -> StoreResult<u64> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("DELETE FROM articles");
        Self::push_filter(&mut builder, filter);
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn update_cover_image(&self, id: Uuid, cover_image_url: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE articles SET cover_image_url = $1 WHERE id = $2")
            .bind(cover_image_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
