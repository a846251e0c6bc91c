use crate::types::{NewsError, RawItem, Result, SourceKind};
use crate::utils::text;
use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

const MAX_SUMMARY_CHARS: usize = 1000;

/// Identity of the feed a parsed item came from.
#[derive(Debug, Clone)]
pub struct FeedOrigin {
    pub source: String,
    pub kind: SourceKind,
    pub feed_url: String,
}

pub struct FeedParser {
    max_items: usize,
}

impl FeedParser {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    /// Parse RSS/Atom content into the newest `max_items` raw items.
    ///
    /// Entries without a link are skipped, as are repeats of a guid or link
    /// within the same document.
    pub fn parse_items(
        &self,
        content: &str,
        origin: &FeedOrigin,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<RawItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| NewsError::Parse(format!("Failed to parse feed {}: {}", origin.feed_url, e)))?;

        let mut seen_guids = HashSet::new();
        let mut seen_links = HashSet::new();
        let mut items = Vec::new();

        for entry in feed.entries {
            if !entry.id.is_empty() && !seen_guids.insert(entry.id.clone()) {
                debug!("Skipping duplicate entry with GUID: {}", entry.id);
                continue;
            }
            if let Some(item) = self.parse_entry(entry, origin, fetched_at) {
                if !seen_links.insert(item.link.clone()) {
                    debug!("Skipping duplicate entry with URL: {}", item.link);
                    continue;
                }
                items.push(item);
            }
        }

        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items.truncate(self.max_items);

        info!("Parsed {} items from {}", items.len(), origin.source);
        Ok(items)
    }

    fn parse_entry(&self, entry: Entry, origin: &FeedOrigin, fetched_at: DateTime<Utc>) -> Option<RawItem> {
        let link = entry.links.first()?.href.trim().to_string();
        if link.is_empty() {
            return None;
        }

        let title = entry
            .title
            .as_ref()
            .map(|t| text::strip_html(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let raw_summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();
        let summary = text::smart_truncate(&text::strip_html(&raw_summary), MAX_SUMMARY_CHARS);

        let published_at = entry.published.or(entry.updated).unwrap_or(fetched_at);
        let image_url = Self::image_url(&entry);

        Some(RawItem {
            title,
            summary,
            link,
            resolved_link: None,
            published_at,
            fetched_at,
            source: origin.source.clone(),
            source_kind: origin.kind,
            feed_url: origin.feed_url.clone(),
            image_url,
        })
    }

    /// First image among media content, media thumbnails and enclosures.
    fn image_url(entry: &Entry) -> Option<String> {
        let from_content = entry.media.iter().flat_map(|m| m.content.iter()).find_map(|c| {
            let is_image = c
                .content_type
                .as_ref()
                .map(|mime| mime.to_string().starts_with("image/"))
                .unwrap_or(true);
            c.url.as_ref().filter(|_| is_image).map(|u| u.to_string())
        });

        from_content.or_else(|| {
            entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .find(|uri| !uri.is_empty())
        })
    }

    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        let has_feed_markers = content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("xmlns=\"http://www.w3.org/2005/atom\"")
            || content_lower.contains("xmlns:atom")
            || content_lower.contains("<channel");

        let has_xml_declaration = content.trim_start().starts_with("<?xml");

        has_feed_markers && (has_xml_declaration || content_lower.contains('<'))
    }
}
