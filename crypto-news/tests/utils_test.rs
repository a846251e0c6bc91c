use crypto_news::utils::similarity::{keyword_overlap, levenshtein, normalized_similarity};
use crypto_news::utils::text::{smart_truncate, strip_html, NormalizedText};
use crypto_news::utils::title::{clean_title, split_publisher_suffix};
use crypto_news::utils::url::{embedded_target, extract_domain, is_aggregator_link, normalize_url};
use crypto_news::utils::significant_keywords;

#[test]
fn test_normalize_url() {
    assert_eq!(
        normalize_url("https://WWW.CoinDesk.com/markets/story/?utm_source=rss#top"),
        "https://www.coindesk.com/markets/story"
    );
    assert_eq!(normalize_url("https://www.coindesk.com/"), "https://www.coindesk.com/");
    assert_eq!(
        normalize_url("https://www.coindesk.com/a?x=1"),
        normalize_url("https://www.coindesk.com/a?x=2")
    );
    assert_eq!(normalize_url("Not A URL/?x=1"), "not a url");
}

#[test]
fn test_url_helpers() {
    assert_eq!(extract_domain("https://www.theblock.co/post/1").as_deref(), Some("theblock.co"));
    assert!(extract_domain("garbage").is_none());

    assert!(is_aggregator_link("https://news.google.com/rss/articles/CBMi"));
    assert!(!is_aggregator_link("https://www.coindesk.com/a"));

    assert_eq!(
        embedded_target("https://news.google.com/url?url=https://www.coindesk.com/a").as_deref(),
        Some("https://www.coindesk.com/a")
    );
    assert!(embedded_target("https://news.google.com/rss/articles/CBMi").is_none());
}

#[test]
fn test_publisher_suffix_and_clean_title() {
    assert_eq!(
        split_publisher_suffix("XYZ Partners With ABC - CoinDesk"),
        ("XYZ Partners With ABC", Some("CoinDesk"))
    );
    assert_eq!(
        split_publisher_suffix("Bitcoin slips - and here is why traders think it keeps going"),
        ("Bitcoin slips - and here is why traders think it keeps going", None)
    );

    assert_eq!(clean_title("Breaking: XYZ Partners With ABC - CoinDesk"), "xyz partners with abc");
    assert_eq!(clean_title("  \"Quoted   headline\" | The Block "), "quoted headline");
}

#[test]
fn test_text_helpers() {
    let text = NormalizedText::new("Hello, World! Layer-2 fees drop.");
    assert!(text.contains("hello world"));
    assert!(text.contains("layer 2"));
    assert!(!text.contains("wor"));
    assert!(!text.contains("   "));

    let repeated = NormalizedText::new("Token, token and more tokens");
    assert_eq!(repeated.occurrences("token"), 2);
    assert_eq!(repeated.occurrences("tokens"), 1);
    assert_eq!(repeated.occurrences("oken"), 0);
    assert_eq!(
        repeated.count_matching(&["token".to_string(), "tokens".to_string()]),
        3
    );

    assert_eq!(strip_html("<p>A &amp; B</p><br/>C"), "A & B C");
    assert_eq!(smart_truncate("First sentence. Second sentence is long", 20), "First sentence.");
    assert_eq!(smart_truncate("short", 20), "short");
}

#[test]
fn test_similarity_and_keywords() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(normalized_similarity("", ""), 1.0);
    assert!(normalized_similarity("bitcoin tops 100k", "bitcoin tops 100k!") > 0.9);

    let keywords = significant_keywords("The SEC approves spot bitcoin ETF for BlackRock", 5);
    assert_eq!(keywords, vec!["sec", "approves", "spot", "bitcoin", "etf"]);

    let other = significant_keywords("SEC approves spot bitcoin ETF, analysts say", 5);
    assert_eq!(keyword_overlap(&keywords, &other), 1.0);
    assert_eq!(keyword_overlap(&keywords, &[]), 0.0);
}
