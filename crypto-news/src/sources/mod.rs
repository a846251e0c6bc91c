pub mod rss_feed;

pub use rss_feed::RssFeedSource;

use crate::config::SourceConfig;
use crate::fetcher::Fetcher;
use crate::traits::FeedSource;
use std::sync::Arc;

/// One HTTP feed source per configured endpoint, sharing a single client.
pub fn from_config(sources: &[SourceConfig], fetcher: Arc<Fetcher>) -> Vec<Arc<dyn FeedSource>> {
    sources
        .iter()
        .map(|config| Arc::new(RssFeedSource::new(config, fetcher.clone())) as Arc<dyn FeedSource>)
        .collect()
}
