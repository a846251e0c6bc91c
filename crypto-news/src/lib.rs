pub mod article_store;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod fetcher;
pub mod keywords;
pub mod lifecycle;
pub mod memory_store;
pub mod parser;
pub mod pipeline;
pub mod service;
pub mod sources;
pub mod traits;
pub mod types;
pub mod utils;
pub mod validator;

pub use types::*;
pub use article_store::PgArticleStore;
pub use cache::{CachedValue, QueryCache};
pub use classifier::NetworkClassifier;
pub use config::NewsConfig;
pub use dedup::{DedupOutcome, Deduplicator, DuplicateReason};
pub use fetcher::Fetcher;
pub use keywords::Dictionaries;
pub use lifecycle::{CategoryStatus, LifecycleManager, SweepReport};
pub use memory_store::MemoryArticleStore;
pub use parser::FeedParser;
pub use service::{ArticleOptions, ArticlesResponse, IngestionReport, NewsService};
pub use sources::RssFeedSource;
pub use traits::{Clock, FeedSource, ManualClock, SystemClock};
pub use validator::ContentValidator;
