use crate::config::SourceConfig;
use crate::fetcher::Fetcher;
use crate::parser::{FeedOrigin, FeedParser};
use crate::traits::FeedSource;
use crate::types::{NewsError, RawItem, Result, SourceKind};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// RSS/Atom feed pulled over HTTP.
pub struct RssFeedSource {
    origin: FeedOrigin,
    fetcher: Arc<Fetcher>,
    parser: FeedParser,
}

impl RssFeedSource {
    pub fn new(config: &SourceConfig, fetcher: Arc<Fetcher>) -> Self {
        let parser = FeedParser::new(fetcher.config().max_items_per_source);
        Self {
            origin: FeedOrigin {
                source: config.name.clone(),
                kind: config.kind,
                feed_url: config.url.clone(),
            },
            fetcher,
            parser,
        }
    }

    /// Resolve aggregator indirection links; unresolvable ones keep the original link.
    async fn resolve_links(&self, items: Vec<RawItem>) -> Vec<RawItem> {
        join_all(items.into_iter().map(|mut item| async move {
            let resolved = self.fetcher.resolve_link(&item.link).await;
            if resolved != item.link {
                item.resolved_link = Some(resolved);
            }
            item
        }))
        .await
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    fn name(&self) -> &str {
        &self.origin.source
    }

    fn kind(&self) -> SourceKind {
        self.origin.kind
    }

    fn feed_url(&self) -> &str {
        &self.origin.feed_url
    }

    async fn pull(&self) -> Result<Vec<RawItem>> {
        info!("Pulling feed {} ({})", self.origin.source, self.origin.feed_url);

        let fetch_result = self.fetcher.fetch_feed(&self.origin.feed_url).await;
        if !fetch_result.success {
            let error_msg = fetch_result.error.unwrap_or_else(|| "Fetch failed".to_string());
            return Err(NewsError::General(error_msg));
        }

        let content = match fetch_result.content {
            Some(content) => content,
            None => {
                warn!("No content returned for feed {}", self.origin.feed_url);
                return Ok(Vec::new());
            }
        };
        if !FeedParser::is_valid_feed_content(&content) {
            return Err(NewsError::Parse(format!(
                "{} did not return RSS or Atom content",
                self.origin.feed_url
            )));
        }

        let items = self
            .parser
            .parse_items(&content, &self.origin, fetch_result.fetch_time)?;

        let items = match self.origin.kind {
            SourceKind::Aggregator => self.resolve_links(items).await,
            SourceKind::Direct => items,
        };

        info!("Pulled {} items from {}", items.len(), self.origin.source);
        Ok(items)
    }
}
