use crate::types::{RawItem, Result, SourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// A feed the ingestion pass can pull items from (RSS feed, aggregator search, test fixture).
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name, also the label used for trusted-source checks
    fn name(&self) -> &str;

    fn kind(&self) -> SourceKind;

    fn feed_url(&self) -> &str;

    /// Fetch and parse the newest items of this source.
    ///
    /// An error only fails this source; the pass carries on with the others.
    async fn pull(&self) -> Result<Vec<RawItem>>;
}

/// Source of "now" for breaking detection, retention and cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
