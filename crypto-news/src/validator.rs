use crate::config::ValidationConfig;
use crate::keywords::Dictionaries;
use crate::types::Verdict;
use crate::utils::text::NormalizedText;
use std::sync::Arc;

/// Indicator counts for one item, as used by the decision ladder.
///
/// Tier counts are occurrences, so a repeated term counts once per use.
/// `network` counts distinct network keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorCounts {
    pub strong: usize,
    pub medium: usize,
    pub weak: usize,
    pub network: usize,
    pub has_crypto_context: bool,
}

/// Decides whether a feed item is about cryptocurrency.
///
/// `validate` is a pure function of its inputs and the dictionaries; it never
/// logs. The pipeline records rejections for audit.
pub struct ContentValidator {
    dictionaries: Arc<Dictionaries>,
    config: ValidationConfig,
}

impl ContentValidator {
    pub fn new(dictionaries: Arc<Dictionaries>, config: ValidationConfig) -> Self {
        Self {
            dictionaries,
            config,
        }
    }

    pub fn validate(&self, title: &str, body: &str, source_label: &str) -> Verdict {
        let via_aggregator = self.dictionaries.is_aggregator_source(source_label);
        self.validate_via(title, body, source_label, via_aggregator)
    }

    /// Like [`validate`](Self::validate), with the aggregator floor forced on
    /// for items known to come through an aggregator feed.
    pub fn validate_via(&self, title: &str, body: &str, source_label: &str, via_aggregator: bool) -> Verdict {
        let dict = &self.dictionaries;
        let text = NormalizedText::new(&format!("{} {}", title, body));

        if dict.is_trusted_source(source_label) {
            return match dict.trusted_source_blacklist.iter().find(|t| text.contains(t)) {
                Some(term) => Verdict::reject(
                    format!("Trusted source but off-topic content: \"{}\"", term),
                    self.config.blacklist_confidence,
                ),
                None => Verdict::accept(
                    format!("Trusted crypto source: {}", source_label),
                    self.config.trusted_source_confidence,
                ),
            };
        }

        let network_terms = dict.network_terms(&text);
        let blacklisted = text
            .matching(&dict.hard_blacklist)
            .into_iter()
            .find(|term| {
                network_terms.is_empty()
                    || !dict
                        .permitted_with_network
                        .iter()
                        .any(|p| p.eq_ignore_ascii_case(term))
            });
        if let Some(term) = blacklisted {
            return Verdict::reject(
                format!("Blacklisted non-crypto content: \"{}\"", term),
                self.config.blacklist_confidence,
            );
        }

        let counts = IndicatorCounts {
            strong: text.count_matching(&dict.strong),
            medium: text.count_matching(&dict.medium),
            weak: text.count_matching(&dict.weak),
            network: network_terms.len(),
            has_crypto_context: text.contains_any(&dict.crypto_context),
        };
        let verdict = self.ladder(&counts);
        if !verdict.is_valid {
            return verdict;
        }

        let unqualified = dict.unqualified_ambiguous(&text);
        if let Some(term) = unqualified.first() {
            if let Some(market) = text.matching(&dict.traditional_market).first() {
                return Verdict::reject(
                    format!(
                        "Ambiguous term \"{}\" without technical context next to market term \"{}\"",
                        term, market
                    ),
                    self.config.ambiguity_confidence,
                );
            }
        }

        if via_aggregator || dict.is_aggregator_source(source_label) {
            if verdict.confidence < self.config.aggregator_min_confidence {
                return Verdict::reject(
                    format!(
                        "Aggregator item below confidence floor ({:.2} < {:.2})",
                        verdict.confidence, self.config.aggregator_min_confidence
                    ),
                    verdict.confidence,
                );
            }
            if let Some(term) = unqualified.first() {
                return Verdict::reject(
                    format!("Aggregator item uses ambiguous term \"{}\" without technical context", term),
                    self.config.ambiguity_confidence,
                );
            }
        }

        verdict
    }

    /// Indicator ladder; the first matching rung decides.
    pub fn ladder(&self, counts: &IndicatorCounts) -> Verdict {
        let c = &self.config;
        if counts.strong >= 2 || counts.network >= 1 {
            Verdict::accept(
                format!("{} strong / {} network indicators", counts.strong, counts.network),
                c.high_confidence,
            )
        } else if counts.strong >= 1 && (counts.medium >= 1 || counts.weak >= 2) {
            Verdict::accept("Strong indicator with supporting terms", c.supported_confidence)
        } else if counts.strong >= 1 {
            Verdict::accept("Single strong indicator", c.strong_only_confidence)
        } else if counts.medium >= 2 && counts.has_crypto_context {
            Verdict::accept("Medium indicators in crypto context", c.medium_context_confidence)
        } else if counts.weak >= 2 && counts.has_crypto_context {
            Verdict::accept("Weak indicators in crypto context", c.weak_context_confidence)
        } else {
            Verdict::reject("Insufficient cryptocurrency indicators", c.reject_confidence)
        }
    }
}
