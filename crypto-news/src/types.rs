use chrono::{DateTime, Utc};
use interfaces::{Category, NewArticle, PersistedArticle, StoreError};
use serde::{Deserialize, Serialize};

use crate::utils::{title, url as url_utils};

/// How a feed reaches its stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The feed belongs to the publisher itself.
    Direct,
    /// A news aggregator relaying other publishers' stories.
    Aggregator,
}

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::Direct
    }
}

/// One feed entry as it came off the wire. Lives for a single pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Publisher URL behind an aggregator indirection link, when it could be resolved.
    pub resolved_link: Option<String>,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
    pub source_kind: SourceKind,
    pub feed_url: String,
    pub image_url: Option<String>,
}

impl RawItem {
    pub fn canonical_link(&self) -> &str {
        self.resolved_link.as_deref().unwrap_or(&self.link)
    }

    pub fn via_aggregator(&self) -> bool {
        self.source_kind == SourceKind::Aggregator
    }
}

/// Outcome of content validation. Pure data; logging is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_valid: bool,
    pub reason: String,
    pub confidence: f64,
}

impl Verdict {
    pub fn accept(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            is_valid: true,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn reject(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            confidence,
        }
    }
}

/// Network, category and urgency tags for a validated item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub network: String,
    pub category: Category,
    pub is_breaking: bool,
}

/// A raw item after validation and classification, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub canonical_url: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub source_kind: SourceKind,
    pub resolved_source: String,
    pub feed_url: String,
    pub image_url: Option<String>,
    pub confidence: f64,
    pub network: String,
    pub category: Category,
    pub is_breaking: bool,
}

impl CandidateArticle {
    pub fn new(item: RawItem, verdict: &Verdict, classification: Classification) -> Self {
        let canonical_url = item.canonical_link().to_string();
        let (title, resolved_source) = match item.source_kind {
            SourceKind::Direct => (item.title.clone(), item.source.clone()),
            SourceKind::Aggregator => match title::split_publisher_suffix(&item.title) {
                (head, Some(publisher)) => (head.to_string(), publisher.to_string()),
                (_, None) => (
                    item.title.clone(),
                    url_utils::extract_domain(&canonical_url).unwrap_or_else(|| item.source.clone()),
                ),
            },
        };

        Self {
            title,
            summary: item.summary,
            link: item.link,
            canonical_url,
            published_at: item.published_at,
            source: item.source,
            source_kind: item.source_kind,
            resolved_source,
            feed_url: item.feed_url,
            image_url: item.image_url,
            confidence: verdict.confidence,
            network: classification.network,
            category: classification.category,
            is_breaking: classification.is_breaking,
        }
    }

    pub fn via_aggregator(&self) -> bool {
        self.source_kind == SourceKind::Aggregator
    }

    pub fn into_new_article(self) -> NewArticle {
        NewArticle {
            via_aggregator: self.via_aggregator(),
            has_source_image: self.image_url.is_some(),
            title: self.title,
            summary: self.summary,
            url: self.canonical_url,
            original_url: self.link,
            source: self.resolved_source,
            feed_source: self.source,
            feed_url: self.feed_url,
            network: self.network,
            category: self.category,
            is_breaking: self.is_breaking,
            confidence: self.confidence,
            published_at: self.published_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based.
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let total_pages = if limit == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

/// One page of the read path, as stored in the query cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    pub data: Vec<PersistedArticle>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
    pub fetch_time: DateTime<Utc>,
    pub response_time_ms: u64,
    pub http_status: Option<u16>,
    pub content: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Datastore error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Timed out after {seconds}s: {url}")]
    Timeout { url: String, seconds: u64 },

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
