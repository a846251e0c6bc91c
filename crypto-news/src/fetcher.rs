use crate::config::FetchConfig;
use crate::types::{FetchResult, NewsError, Result};
use crate::utils::url as url_utils;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET a feed body, retrying transport errors and non-success statuses
    /// with exponential backoff. Failure is reported in the result, not as `Err`.
    pub async fn fetch_feed(&self, url: &str) -> FetchResult {
        let start_time = Instant::now();
        let fetch_time = Utc::now();

        debug!("Fetching feed: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error: Option<NewsError> = None;
        let mut last_status = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    last_status = Some(status.as_u16());

                    if !status.is_success() {
                        last_error = Some(NewsError::General(format!(
                            "HTTP {}: {}",
                            status,
                            status.canonical_reason().unwrap_or("Unknown")
                        )));
                    } else if let Some(size_mb) = response
                        .content_length()
                        .map(|len| len as usize / (1024 * 1024))
                        .filter(|size_mb| *size_mb > self.config.max_feed_size_mb)
                    {
                        // Retrying won't shrink the feed.
                        return self.failure(url, fetch_time, start_time, last_status, NewsError::FeedTooLarge { size_mb });
                    } else {
                        match response.text().await {
                            Ok(content) => {
                                info!("Fetched feed: {} ({} bytes)", url, content.len());
                                return FetchResult {
                                    url: url.to_string(),
                                    success: true,
                                    error: None,
                                    fetch_time,
                                    response_time_ms: start_time.elapsed().as_millis() as u64,
                                    http_status: last_status,
                                    content: Some(content),
                                };
                            }
                            Err(e) => last_error = Some(NewsError::Http(e)),
                        }
                    }
                }
                Err(e) => last_error = Some(NewsError::Http(e)),
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);
        let error = last_error.unwrap_or_else(|| NewsError::General("Unknown error".to_string()));
        self.failure(url, fetch_time, start_time, last_status, error)
    }

    fn failure(
        &self,
        url: &str,
        fetch_time: chrono::DateTime<Utc>,
        start_time: Instant,
        http_status: Option<u16>,
        error: NewsError,
    ) -> FetchResult {
        FetchResult {
            url: url.to_string(),
            success: false,
            error: Some(error.to_string()),
            fetch_time,
            response_time_ms: start_time.elapsed().as_millis() as u64,
            http_status,
            content: None,
        }
    }

    /// Publisher URL behind an aggregator link. Never fails: when the link
    /// can't be resolved in time the original is returned.
    pub async fn resolve_link(&self, link: &str) -> String {
        if !url_utils::is_aggregator_link(link) {
            return link.to_string();
        }
        if let Some(target) = url_utils::embedded_target(link) {
            return target;
        }

        let timeout = Duration::from_secs(self.config.resolve_timeout_seconds);
        match tokio::time::timeout(timeout, self.follow_redirects(link)).await {
            Ok(Ok(resolved)) if !url_utils::is_aggregator_link(&resolved) => {
                debug!("Resolved {} -> {}", link, resolved);
                resolved
            }
            Ok(Ok(_)) => {
                debug!("Redirects for {} stayed on the aggregator", link);
                link.to_string()
            }
            Ok(Err(e)) => {
                debug!("Could not resolve {}: {}", link, e);
                link.to_string()
            }
            Err(_) => {
                debug!("Timed out resolving {}", link);
                link.to_string()
            }
        }
    }

    async fn follow_redirects(&self, link: &str) -> Result<String> {
        let response = self.client.head(link).send().await?;
        let resolved = response.url().to_string();
        if resolved != link {
            return Ok(resolved);
        }
        // Some aggregators don't answer HEAD with a redirect.
        let response = self.client.get(link).send().await?;
        Ok(response.url().to_string())
    }
}
