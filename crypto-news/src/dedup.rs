use crate::config::DedupConfig;
use crate::types::CandidateArticle;
use crate::utils::{significant_keywords, similarity, title, url as url_utils};
use interfaces::PersistedArticle;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    /// Same link once query string and fragment are dropped.
    Url,
    /// Cleaned headlines are near-identical.
    Title,
    /// Aggregator copy of a story already kept from a direct feed.
    CrossSource,
    /// Aggregator item of this batch replaced by the direct copy of the story.
    Superseded,
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DuplicateReason::Url => "url",
            DuplicateReason::Title => "title",
            DuplicateReason::CrossSource => "cross_source",
            DuplicateReason::Superseded => "superseded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub title: String,
    pub url: String,
    pub reason: DuplicateReason,
    /// Title of the kept article this one collided with.
    pub duplicate_of: String,
}

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub unique: Vec<CandidateArticle>,
    pub duplicates: Vec<DuplicateRecord>,
}

/// Comparison keys of one kept story.
#[derive(Debug, Clone)]
struct Fingerprint {
    urls: Vec<String>,
    cleaned_title: String,
    keywords: Vec<String>,
    via_aggregator: bool,
}

impl Fingerprint {
    fn build(canonical: &str, original: &str, headline: &str, via_aggregator: bool, prefix_len: usize) -> Self {
        let mut urls = vec![url_utils::normalize_url(canonical)];
        let original = url_utils::normalize_url(original);
        if !urls.contains(&original) {
            urls.push(original);
        }
        let cleaned_title = title::clean_title(headline);
        let keywords = significant_keywords(&cleaned_title, prefix_len);

        Self {
            urls,
            cleaned_title,
            keywords,
            via_aggregator,
        }
    }
}

struct Kept {
    fingerprint: Fingerprint,
    title: String,
    /// `None` for articles seeded from the datastore; those are never emitted.
    candidate: Option<CandidateArticle>,
}

impl Kept {
    /// Only aggregator items from the current batch may give way to a direct copy.
    fn supersedable(&self) -> bool {
        self.candidate.is_some() && self.fingerprint.via_aggregator
    }
}

pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Unique subset of `candidates`, first seen wins.
    pub fn dedupe(&self, candidates: Vec<CandidateArticle>) -> DedupOutcome {
        self.dedupe_against(&[], candidates)
    }

    /// Same as [`dedupe`](Self::dedupe), with `existing` articles already in the kept set.
    pub fn dedupe_against(
        &self,
        existing: &[PersistedArticle],
        candidates: Vec<CandidateArticle>,
    ) -> DedupOutcome {
        let prefix_len = self.config.keyword_prefix_len;
        let mut kept: Vec<Kept> = existing
            .iter()
            .map(|article| Kept {
                fingerprint: Fingerprint::build(
                    &article.url,
                    &article.original_url,
                    &article.title,
                    article.via_aggregator,
                    prefix_len,
                ),
                title: article.title.clone(),
                candidate: None,
            })
            .collect();
        let mut duplicates = Vec::new();

        for candidate in candidates {
            let fingerprint = Fingerprint::build(
                &candidate.canonical_url,
                &candidate.link,
                &candidate.title,
                candidate.via_aggregator(),
                prefix_len,
            );

            let matches: Vec<(usize, DuplicateReason)> = kept
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    self.match_reason(&fingerprint, &entry.fingerprint)
                        .map(|reason| (index, reason))
                })
                .collect();

            let blocking = matches.iter().find(|(index, _)| {
                fingerprint.via_aggregator || !kept[*index].supersedable()
            });
            if let Some((index, reason)) = blocking {
                tracing::debug!(
                    title = %candidate.title,
                    reason = %reason,
                    duplicate_of = %kept[*index].title,
                    "Dropping duplicate"
                );
                duplicates.push(DuplicateRecord {
                    title: candidate.title,
                    url: candidate.canonical_url,
                    reason: *reason,
                    duplicate_of: kept[*index].title.clone(),
                });
                continue;
            }

            if !matches.is_empty() {
                let replaced: Vec<usize> = matches.iter().map(|(index, _)| *index).collect();
                let mut index = 0;
                kept.retain(|entry| {
                    let keep = !replaced.contains(&index);
                    index += 1;
                    if !keep {
                        tracing::debug!(
                            title = %entry.title,
                            replaced_by = %candidate.title,
                            "Direct item supersedes aggregator copy"
                        );
                        if let Some(dropped) = &entry.candidate {
                            duplicates.push(DuplicateRecord {
                                title: dropped.title.clone(),
                                url: dropped.canonical_url.clone(),
                                reason: DuplicateReason::Superseded,
                                duplicate_of: candidate.title.clone(),
                            });
                        }
                    }
                    keep
                });
            }

            kept.push(Kept {
                fingerprint,
                title: candidate.title.clone(),
                candidate: Some(candidate),
            });
        }

        DedupOutcome {
            unique: kept.into_iter().filter_map(|entry| entry.candidate).collect(),
            duplicates,
        }
    }

    /// Rules are symmetric except the cross-source one, which only fires for an
    /// aggregator item against a direct item.
    fn match_reason(&self, candidate: &Fingerprint, kept: &Fingerprint) -> Option<DuplicateReason> {
        if candidate.urls.iter().any(|url| kept.urls.contains(url)) {
            return Some(DuplicateReason::Url);
        }

        if self.titles_similar(&candidate.cleaned_title, &kept.cleaned_title) {
            return Some(DuplicateReason::Title);
        }

        if candidate.via_aggregator != kept.via_aggregator
            && similarity::keyword_overlap(&candidate.keywords, &kept.keywords)
                >= self.config.keyword_similarity_threshold
        {
            return Some(DuplicateReason::CrossSource);
        }

        None
    }

    fn titles_similar(&self, a: &str, b: &str) -> bool {
        let threshold = self.config.title_similarity_threshold;
        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        let longest = len_a.max(len_b);
        if longest == 0 {
            return false;
        }
        // Edit distance is at least the length difference.
        if 1.0 - (len_a.abs_diff(len_b) as f64 / longest as f64) < threshold {
            return false;
        }
        similarity::normalized_similarity(a, b) >= threshold
    }
}
