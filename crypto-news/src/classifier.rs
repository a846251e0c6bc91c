use crate::config::ClassifierConfig;
use crate::keywords::Dictionaries;
use crate::types::Classification;
use crate::utils::text::NormalizedText;
use chrono::{DateTime, Duration, Utc};
use interfaces::{Category, GENERAL_NETWORK};
use std::sync::Arc;

/// Tags validated items with a network, a category and the breaking flag.
pub struct NetworkClassifier {
    dictionaries: Arc<Dictionaries>,
    breaking_window: Duration,
}

impl NetworkClassifier {
    pub fn new(dictionaries: Arc<Dictionaries>, config: &ClassifierConfig) -> Self {
        Self {
            dictionaries,
            breaking_window: Duration::hours(config.breaking_window_hours),
        }
    }

    pub fn classify(
        &self,
        title: &str,
        body: &str,
        published_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Classification {
        let text = NormalizedText::new(&format!("{} {}", title, body));

        Classification {
            network: self.network(&text),
            category: self.category(&text),
            is_breaking: self.is_breaking(title, published_at, now),
        }
    }

    pub fn network(&self, text: &NormalizedText) -> String {
        self.dictionaries
            .first_network(text)
            .map(|network| network.name.clone())
            .unwrap_or_else(|| GENERAL_NETWORK.to_string())
    }

    pub fn category(&self, text: &NormalizedText) -> Category {
        self.dictionaries.first_category(text).unwrap_or_default()
    }

    /// Urgency wording in the title, or published within the breaking window.
    /// Items dated in the future count as recent.
    pub fn is_breaking(&self, title: &str, published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let title = NormalizedText::new(title);
        title.contains_any(&self.dictionaries.urgency) || now - published_at < self.breaking_window
    }
}
