#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_news::types::{
    CandidateArticle, Classification, NewsError, RawItem, Result, SourceKind, Verdict,
};
use crypto_news::FeedSource;
use interfaces::{Category, NewArticle, GENERAL_NETWORK};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed "now" shared by the tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap()
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    base_time() - Duration::minutes(minutes)
}

pub fn raw_item(source: &str, kind: SourceKind, title: &str, summary: &str, link: &str, published_at: DateTime<Utc>) -> RawItem {
    RawItem {
        title: title.to_string(),
        summary: summary.to_string(),
        link: link.to_string(),
        resolved_link: None,
        published_at,
        fetched_at: base_time(),
        source: source.to_string(),
        source_kind: kind,
        feed_url: format!("https://feeds.example.com/{}", source.to_lowercase().replace(' ', "-")),
        image_url: None,
    }
}

pub fn direct(title: &str, link: &str, published_at: DateTime<Utc>) -> CandidateArticle {
    candidate(raw_item("CoinDesk", SourceKind::Direct, title, "", link, published_at))
}

pub fn via_aggregator(title: &str, link: &str, published_at: DateTime<Utc>) -> CandidateArticle {
    candidate(raw_item("Google News", SourceKind::Aggregator, title, "", link, published_at))
}

pub fn candidate(item: RawItem) -> CandidateArticle {
    CandidateArticle::new(
        item,
        &Verdict::accept("test", 0.95),
        Classification {
            network: GENERAL_NETWORK.to_string(),
            category: Category::General,
            is_breaking: false,
        },
    )
}

pub fn new_article(title: &str, url: &str, network: &str, is_breaking: bool, published_at: DateTime<Utc>) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        summary: format!("Summary of {}", title),
        url: url.to_string(),
        original_url: url.to_string(),
        source: "CoinDesk".to_string(),
        feed_source: "CoinDesk".to_string(),
        feed_url: "https://www.coindesk.com/arc/outboundfeeds/rss/".to_string(),
        network: network.to_string(),
        category: Category::General,
        is_breaking,
        confidence: 0.95,
        via_aggregator: false,
        has_source_image: false,
        published_at,
    }
}

/// Feed source serving a fixed, replaceable list of items.
pub struct StaticSource {
    name: String,
    kind: SourceKind,
    feed_url: String,
    items: Mutex<Vec<RawItem>>,
}

impl StaticSource {
    pub fn new(name: &str, kind: SourceKind, items: Vec<RawItem>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            feed_url: format!("https://feeds.example.com/{}", name.to_lowercase().replace(' ', "-")),
            items: Mutex::new(items),
        }
    }

    pub fn push(&self, item: RawItem) {
        self.items.lock().unwrap().push(item);
    }
}

#[async_trait]
impl FeedSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn feed_url(&self) -> &str {
        &self.feed_url
    }

    async fn pull(&self) -> Result<Vec<RawItem>> {
        Ok(self.items.lock().unwrap().clone())
    }
}

/// Source that always fails, as an unreachable feed would.
pub struct FailingSource;

#[async_trait]
impl FeedSource for FailingSource {
    fn name(&self) -> &str {
        "Broken Feed"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Direct
    }

    fn feed_url(&self) -> &str {
        "https://broken.example.com/rss"
    }

    async fn pull(&self) -> Result<Vec<RawItem>> {
        Err(NewsError::General("HTTP 503: Service Unavailable".to_string()))
    }
}

/// Source that never answers within the pass timeout.
pub struct HangingSource;

#[async_trait]
impl FeedSource for HangingSource {
    fn name(&self) -> &str {
        "Slow Feed"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Direct
    }

    fn feed_url(&self) -> &str {
        "https://slow.example.com/rss"
    }

    async fn pull(&self) -> Result<Vec<RawItem>> {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}
