use crate::keywords::{Dictionaries, CLIENT_NETWORKS};
use crate::types::{NewsError, Result, SourceKind};
use interfaces::ArticleFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One day.
pub const MAX_TTL_SECONDS: i64 = 86_400;
/// Ten years.
pub const MAX_RETENTION_HOURS: i64 = 87_600;
/// Thirty days.
pub const MAX_BREAKING_WINDOW_HOURS: i64 = 720;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
    /// Only the newest entries of each feed enter a pass.
    pub max_items_per_source: usize,
    /// Upper bound for a whole source pull, retries included.
    pub source_timeout_seconds: u64,
    pub resolve_timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "CryptoNews-Ingest/1.0".to_string(),
            timeout_seconds: 15,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_feed_size_mb: 10,
            max_redirects: 5,
            max_items_per_source: 20,
            source_timeout_seconds: 45,
            resolve_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: SourceKind,
}

impl SourceConfig {
    pub fn direct(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind: SourceKind::Direct,
        }
    }

    pub fn aggregator(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind: SourceKind::Aggregator,
        }
    }
}

/// Feeds polled when the config file names none.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::direct("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/"),
        SourceConfig::direct("Cointelegraph", "https://cointelegraph.com/rss"),
        SourceConfig::direct("Decrypt", "https://decrypt.co/feed"),
        SourceConfig::direct("The Block", "https://www.theblock.co/rss.xml"),
        SourceConfig::direct("Bitcoin Magazine", "https://bitcoinmagazine.com/.rss/full/"),
        SourceConfig::direct("CryptoSlate", "https://cryptoslate.com/feed/"),
        SourceConfig::direct("Blockworks", "https://blockworks.co/feed"),
        SourceConfig::direct("Hedera Blog", "https://hedera.com/blog/rss.xml"),
        SourceConfig::aggregator(
            "Google News",
            "https://news.google.com/rss/search?q=cryptocurrency&hl=en-US&gl=US&ceid=US:en",
        ),
    ]
}

/// Confidence values of the validation ladder. Empirical, tune per corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub trusted_source_confidence: f64,
    pub blacklist_confidence: f64,
    pub high_confidence: f64,
    pub supported_confidence: f64,
    pub strong_only_confidence: f64,
    pub medium_context_confidence: f64,
    pub weak_context_confidence: f64,
    pub reject_confidence: f64,
    pub ambiguity_confidence: f64,
    pub aggregator_min_confidence: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            trusted_source_confidence: 0.95,
            blacklist_confidence: 0.95,
            high_confidence: 0.95,
            supported_confidence: 0.85,
            strong_only_confidence: 0.8,
            medium_context_confidence: 0.75,
            weak_context_confidence: 0.6,
            reject_confidence: 0.7,
            ambiguity_confidence: 0.9,
            aggregator_min_confidence: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub title_similarity_threshold: f64,
    pub keyword_similarity_threshold: f64,
    pub keyword_prefix_len: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_similarity_threshold: 0.85,
            keyword_similarity_threshold: 0.8,
            keyword_prefix_len: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub breaking_window_hours: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            breaking_window_hours: 2,
        }
    }
}

/// Which persisted articles a cap counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LimitScope {
    All,
    Breaking,
    Network { network: String },
    NetworkGroup { networks: Vec<String> },
}

impl LimitScope {
    pub fn filter(&self) -> ArticleFilter {
        match self {
            LimitScope::All => ArticleFilter::all(),
            LimitScope::Breaking => ArticleFilter::all().breaking(true),
            LimitScope::Network { network } => ArticleFilter::all().network(network.clone()),
            LimitScope::NetworkGroup { networks } => {
                ArticleFilter::all().networks(networks.iter().cloned())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLimit {
    pub name: String,
    pub scope: LimitScope,
    pub max: usize,
}

impl CategoryLimit {
    pub fn new(name: &str, scope: LimitScope, max: usize) -> Self {
        Self {
            name: name.to_string(),
            scope,
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub retention_hours: i64,
    pub limits: Vec<CategoryLimit>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        let mut limits = vec![
            CategoryLimit::new("global", LimitScope::All, 500),
            CategoryLimit::new("breaking", LimitScope::Breaking, 50),
        ];
        for client in CLIENT_NETWORKS {
            limits.push(CategoryLimit::new(
                &format!("network:{}", client),
                LimitScope::Network {
                    network: client.to_string(),
                },
                100,
            ));
        }
        limits.push(CategoryLimit::new(
            "clients",
            LimitScope::NetworkGroup {
                networks: CLIENT_NETWORKS.iter().map(|c| c.to_string()).collect(),
            },
            250,
        ));

        Self {
            retention_hours: 96,
            limits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: i64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub fetch: FetchConfig,
    pub sources: Vec<SourceConfig>,
    pub validation: ValidationConfig,
    pub classifier: ClassifierConfig,
    pub dedup: DedupConfig,
    pub retention: RetentionConfig,
    pub cache: CacheConfig,
    pub dictionaries: Dictionaries,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            sources: default_sources(),
            validation: ValidationConfig::default(),
            classifier: ClassifierConfig::default(),
            dedup: DedupConfig::default(),
            retention: RetentionConfig::default(),
            cache: CacheConfig::default(),
            dictionaries: Dictionaries::default(),
        }
    }
}

impl NewsConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: NewsConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(NewsError::Config(format!("{} must be within 0..=1, got {}", name, value)))
            }
        };
        unit("dedup.title_similarity_threshold", self.dedup.title_similarity_threshold)?;
        unit("dedup.keyword_similarity_threshold", self.dedup.keyword_similarity_threshold)?;
        unit("validation.aggregator_min_confidence", self.validation.aggregator_min_confidence)?;

        // Upper bounds keep the chrono durations built from these in range.
        let bounded = |name: &str, value: i64, max: i64| {
            if (1..=max).contains(&value) {
                Ok(())
            } else {
                Err(NewsError::Config(format!("{} must be within 1..={}, got {}", name, max, value)))
            }
        };
        bounded("cache.ttl_seconds", self.cache.ttl_seconds, MAX_TTL_SECONDS)?;
        bounded("retention.retention_hours", self.retention.retention_hours, MAX_RETENTION_HOURS)?;
        bounded(
            "classifier.breaking_window_hours",
            self.classifier.breaking_window_hours,
            MAX_BREAKING_WINDOW_HOURS,
        )?;
        if self.fetch.source_timeout_seconds == 0 {
            return Err(NewsError::Config("fetch.source_timeout_seconds must be positive".to_string()));
        }
        if let Some(limit) = self.retention.limits.iter().find(|l| l.name.trim().is_empty()) {
            return Err(NewsError::Config(format!("retention limit with empty name (max {})", limit.max)));
        }
        if let Some(source) = self
            .sources
            .iter()
            .find(|s| !crate::utils::url::is_valid_feed_url(&s.url))
        {
            return Err(NewsError::Config(format!("invalid feed url for {}: {}", source.name, source.url)));
        }
        Ok(())
    }
}
