mod common;

use chrono::Duration;
use common::{base_time, minutes_ago};
use crypto_news::config::ClassifierConfig;
use crypto_news::keywords::Dictionaries;
use crypto_news::NetworkClassifier;
use interfaces::Category;
use std::sync::Arc;

fn classifier() -> NetworkClassifier {
    NetworkClassifier::new(Arc::new(Dictionaries::default()), &ClassifierConfig::default())
}

#[test]
fn test_client_network_wins_over_generic_network() {
    let c = classifier();
    let tagged = c.classify(
        "Bitcoin treasury firm adds HBAR to balance sheet",
        "The company now holds bitcoin and Hedera tokens.",
        minutes_ago(600),
        base_time(),
    );
    assert_eq!(tagged.network, "Hedera");
}

#[test]
fn test_network_defaults_to_general() {
    let c = classifier();
    let tagged = c.classify("Stablecoin issuers publish reserve reports", "", minutes_ago(600), base_time());
    assert_eq!(tagged.network, "General");
}

#[test]
fn test_unqualified_ambiguous_term_does_not_tag_network() {
    let c = classifier();

    let tagged = c.classify("Optimism returns as arbitrum recovers", "", minutes_ago(600), base_time());
    assert_eq!(tagged.network, "Arbitrum");

    let tagged = c.classify("Optimism rollup activity hits record", "", minutes_ago(600), base_time());
    assert_eq!(tagged.network, "Optimism");
}

#[test]
fn test_category_first_match_wins() {
    let c = classifier();
    let at = minutes_ago(600);

    assert_eq!(c.classify("Bitcoin price surges past resistance", "", at, base_time()).category, Category::Market);
    assert_eq!(
        c.classify("SEC files lawsuit against crypto lender", "", at, base_time()).category,
        Category::Regulation
    );
    assert_eq!(
        c.classify("Ethereum developers schedule upgrade", "", at, base_time()).category,
        Category::Technology
    );
    assert_eq!(c.classify("Community call recap", "", at, base_time()).category, Category::General);
}

#[test]
fn test_breaking_from_recency_or_urgency() {
    let c = classifier();
    let now = base_time();

    assert!(c.is_breaking("Ethereum developers schedule upgrade", now - Duration::minutes(30), now));
    assert!(!c.is_breaking("Ethereum developers schedule upgrade", now - Duration::hours(3), now));
    assert!(c.is_breaking("Breaking: exchange halts withdrawals", now - Duration::hours(30), now));
    assert!(c.is_breaking("JUST IN - ETF approved", now - Duration::hours(30), now));
    // Two hours old is outside the window.
    assert!(!c.is_breaking("Weekly recap", now - Duration::hours(2), now));
}
