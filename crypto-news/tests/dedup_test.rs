mod common;

use common::{direct, init_tracing, minutes_ago, new_article, via_aggregator};
use crypto_news::config::DedupConfig;
use crypto_news::types::SourceKind;
use crypto_news::{DuplicateReason, Deduplicator};
use interfaces::{PersistedArticle, GENERAL_NETWORK};

fn deduplicator() -> Deduplicator {
    Deduplicator::new(DedupConfig::default())
}

fn titles(outcome: &crypto_news::DedupOutcome) -> Vec<String> {
    outcome.unique.iter().map(|c| c.title.clone()).collect()
}

#[test]
fn test_urls_differing_by_query_string_collapse() {
    init_tracing();
    let outcome = deduplicator().dedupe(vec![
        direct("Exchange lists new token", "https://www.coindesk.com/markets/listing?utm_source=rss", minutes_ago(10)),
        direct("Exchange lists new token", "https://www.coindesk.com/markets/listing?utm_source=x#top", minutes_ago(12)),
    ]);

    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].reason, DuplicateReason::Url);
}

#[test]
fn test_near_identical_titles_collapse() {
    let outcome = deduplicator().dedupe(vec![
        direct("Bitcoin tops $100,000 for the first time", "https://a.example.com/1", minutes_ago(5)),
        direct("Breaking: Bitcoin tops $100,000 for first time", "https://b.example.com/2", minutes_ago(6)),
        direct("Solana validators vote on fee change", "https://c.example.com/3", minutes_ago(7)),
    ]);

    assert_eq!(
        titles(&outcome),
        vec!["Bitcoin tops $100,000 for the first time", "Solana validators vote on fee change"]
    );
    assert_eq!(outcome.duplicates[0].reason, DuplicateReason::Title);
}

#[test]
fn test_direct_item_preferred_over_aggregator_copy() {
    let agg = via_aggregator(
        "XYZ Partners With ABC \u{2014} CoinDesk",
        "https://news.google.com/rss/articles/CBMiXYZ",
        minutes_ago(3),
    );
    let dir = direct("XYZ Partners With ABC", "https://www.coindesk.com/business/xyz-abc", minutes_ago(5));

    for batch in [vec![agg.clone(), dir.clone()], vec![dir.clone(), agg.clone()]] {
        let outcome = deduplicator().dedupe(batch);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(outcome.unique[0].source_kind, SourceKind::Direct);
        assert_eq!(outcome.unique[0].canonical_url, "https://www.coindesk.com/business/xyz-abc");
    }

    let outcome = deduplicator().dedupe(vec![agg, dir]);
    assert_eq!(outcome.duplicates[0].reason, DuplicateReason::Superseded);
}

#[test]
fn test_aggregator_item_dropped_on_keyword_overlap_with_direct_item() {
    let outcome = deduplicator().dedupe(vec![
        direct("SEC approves spot bitcoin ETF for BlackRock", "https://www.theblock.co/post/1", minutes_ago(20)),
        via_aggregator(
            "SEC approves spot bitcoin ETF for BlackRock, analysts say",
            "https://news.google.com/rss/articles/CBMi1",
            minutes_ago(15),
        ),
    ]);
    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.duplicates[0].reason, DuplicateReason::CrossSource);

    // Keyword overlap alone never merges two direct items.
    let outcome = deduplicator().dedupe(vec![
        direct("SEC approves spot bitcoin ETF for BlackRock", "https://www.theblock.co/post/1", minutes_ago(20)),
        direct(
            "SEC approves spot bitcoin ETF for BlackRock, analysts say",
            "https://www.coindesk.com/policy/2",
            minutes_ago(15),
        ),
    ]);
    assert_eq!(outcome.unique.len(), 2);
}

#[test]
fn test_dedupe_is_idempotent() {
    let batch = vec![
        via_aggregator("XYZ Partners With ABC - CoinDesk", "https://news.google.com/rss/articles/A", minutes_ago(1)),
        direct("XYZ Partners With ABC", "https://www.coindesk.com/xyz", minutes_ago(2)),
        direct("XYZ Partners With ABC", "https://www.coindesk.com/xyz?ref=home", minutes_ago(3)),
        direct("Polkadot parachain auction opens", "https://www.decrypt.co/polkadot", minutes_ago(4)),
        via_aggregator("Cardano upgrade goes live - Decrypt", "https://news.google.com/rss/articles/B", minutes_ago(5)),
    ];

    let once = deduplicator().dedupe(batch);
    let twice = deduplicator().dedupe(once.unique.clone());

    assert_eq!(titles(&once), titles(&twice));
    assert!(twice.duplicates.is_empty());
    assert_eq!(once.unique.len(), 3);
}

#[test]
fn test_persisted_articles_seed_but_are_not_emitted() {
    let stored = PersistedArticle::from_new(
        new_article(
            "Chainlink adds new price feeds",
            "https://www.coindesk.com/tech/chainlink-feeds",
            GENERAL_NETWORK,
            false,
            minutes_ago(120),
        ),
        minutes_ago(100),
    );

    let outcome = deduplicator().dedupe_against(
        &[stored],
        vec![
            direct("Chainlink adds new price feeds", "https://www.coindesk.com/tech/chainlink-feeds?utm=rss", minutes_ago(120)),
            direct("Arbitrum DAO votes on grants", "https://www.coindesk.com/tech/arbitrum-dao", minutes_ago(30)),
        ],
    );

    assert_eq!(titles(&outcome), vec!["Arbitrum DAO votes on grants"]);
}

#[test]
fn test_persisted_aggregator_article_is_not_superseded() {
    let mut article = new_article(
        "XYZ Partners With ABC",
        "https://news.google.com/rss/articles/CBMiXYZ",
        GENERAL_NETWORK,
        false,
        minutes_ago(60),
    );
    article.via_aggregator = true;
    let stored = PersistedArticle::from_new(article, minutes_ago(55));

    let outcome = deduplicator().dedupe_against(
        &[stored],
        vec![direct("XYZ Partners With ABC", "https://www.coindesk.com/business/xyz-abc", minutes_ago(58))],
    );

    assert!(outcome.unique.is_empty());
    assert_eq!(outcome.duplicates[0].reason, DuplicateReason::Title);
}
