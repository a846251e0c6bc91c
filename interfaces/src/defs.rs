use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Network tag used when no known network is mentioned.
pub const GENERAL_NETWORK: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Market,
    Regulation,
    Technology,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Market => "market",
            Category::Regulation => "regulation",
            Category::Technology => "technology",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Category::General),
            "market" => Ok(Category::Market),
            "regulation" => Ok(Category::Regulation),
            "technology" => Ok(Category::Technology),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// An article that survived validation and deduplication, ready to be
/// handed to the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    /// Canonical URL (aggregator links already resolved to the publisher).
    pub url: String,
    /// Link exactly as it appeared in the feed.
    pub original_url: String,
    /// Publisher name; may differ from `feed_source` for aggregator items.
    pub source: String,
    pub feed_source: String,
    pub feed_url: String,
    pub network: String,
    pub category: Category,
    pub is_breaking: bool,
    pub confidence: f64,
    pub via_aggregator: bool,
    pub has_source_image: bool,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedArticle {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub original_url: String,
    pub source: String,
    pub feed_source: String,
    pub feed_url: String,
    pub network: String,
    pub category: Category,
    pub is_breaking: bool,
    pub confidence: f64,
    pub via_aggregator: bool,
    pub has_source_image: bool,
    pub published_at: DateTime<Utc>,
    /// Filled in later by the image subsystem.
    pub cover_image_url: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

impl PersistedArticle {
    pub fn from_new(article: NewArticle, inserted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: article.title,
            summary: article.summary,
            url: article.url,
            original_url: article.original_url,
            source: article.source,
            feed_source: article.feed_source,
            feed_url: article.feed_url,
            network: article.network,
            category: article.category,
            is_breaking: article.is_breaking,
            confidence: article.confidence,
            via_aggregator: article.via_aggregator,
            has_source_image: article.has_source_image,
            published_at: article.published_at,
            cover_image_url: None,
            inserted_at,
        }
    }
}

/// Conjunction of optional predicates over persisted articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleFilter {
    /// Matches if the article's network is any of these (case-insensitive).
    pub networks: Option<Vec<String>>,
    pub category: Option<Category>,
    pub breaking: Option<bool>,
    /// Case-insensitive substring match on title or summary.
    pub search: Option<String>,
    pub published_before: Option<DateTime<Utc>>,
    pub published_after: Option<DateTime<Utc>>,
    pub ids: Option<Vec<Uuid>>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.networks = Some(vec![network.into()]);
        self
    }

    pub fn networks<I, S>(mut self, networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.networks = Some(networks.into_iter().map(Into::into).collect());
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

    pub fn published_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.published_before = Some(cutoff);
        self
    }

    pub fn published_after(mut self, cutoff: DateTime<Utc>) -> Self {
        self.published_after = Some(cutoff);
        self
    }

    pub fn ids(mut self, ids: Vec<Uuid>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Reference semantics for the filter; SQL-backed stores must agree with it.
    pub fn matches(&self, article: &PersistedArticle) -> bool {
        if let Some(networks) = &self.networks {
            if !networks.iter().any(|n| n.eq_ignore_ascii_case(&article.network)) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if article.category != category {
                return false;
            }
        }
        if let Some(breaking) = self.breaking {
            if article.is_breaking != breaking {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !article.title.to_lowercase().contains(&term)
                && !article.summary.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if let Some(cutoff) = self.published_before {
            if article.published_at >= cutoff {
                return false;
            }
        }
        if let Some(cutoff) = self.published_after {
            if article.published_at < cutoff {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&article.id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently published first.
    Newest,
    /// Oldest published first.
    Oldest,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Newest
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub sort: SortOrder,
    pub offset: usize,
    /// `None` returns every match; `Some(0)` only counts.
    pub limit: Option<usize>,
}

impl ArticleQuery {
    pub fn new(filter: ArticleFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn count_only(filter: ArticleFilter) -> Self {
        Self {
            filter,
            limit: Some(0),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub items: Vec<PersistedArticle>,
    /// Number of matches before pagination.
    pub total_count: usize,
}
