use crypto_news::config::{LimitScope, NewsConfig, MAX_RETENTION_HOURS, MAX_TTL_SECONDS};
use crypto_news::types::{NewsError, SourceKind};
use std::path::PathBuf;

fn write_temp_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("crypto-news-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_default_config_is_valid() {
    let config = NewsConfig::default();
    config.validate().unwrap();

    assert_eq!(config.retention.retention_hours, 96);
    assert_eq!(config.cache.ttl_seconds, 300);
    assert_eq!(config.dedup.title_similarity_threshold, 0.85);
    assert!(config
        .sources
        .iter()
        .any(|s| s.kind == SourceKind::Aggregator && s.name == "Google News"));
    assert_eq!(config.retention.limits[0].scope, LimitScope::All);
    assert_eq!(config.retention.limits[0].max, 500);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let path = write_temp_config(
        r#"{
            "cache": { "ttl_seconds": 60 },
            "sources": [
                { "name": "CoinDesk", "url": "https://www.coindesk.com/arc/outboundfeeds/rss/" },
                { "name": "Google News", "url": "https://news.google.com/rss/search?q=crypto", "kind": "aggregator" }
            ],
            "retention": {
                "limits": [
                    { "name": "global", "scope": { "type": "all" }, "max": 200 },
                    { "name": "hedera", "scope": { "type": "network", "network": "Hedera" }, "max": 20 }
                ]
            }
        }"#,
    );

    let config = NewsConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.cache.ttl_seconds, 60);
    assert_eq!(config.cache.default_page_size, 20);
    assert_eq!(config.retention.retention_hours, 96);
    assert_eq!(config.retention.limits.len(), 2);
    assert_eq!(
        config.retention.limits[1].scope,
        LimitScope::Network {
            network: "Hedera".to_string()
        }
    );
    assert_eq!(config.sources[0].kind, SourceKind::Direct);
    assert_eq!(config.sources[1].kind, SourceKind::Aggregator);
    assert_eq!(config.fetch.max_items_per_source, 20);
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = NewsConfig::default();
    config.dedup.title_similarity_threshold = 1.5;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));

    let mut config = NewsConfig::default();
    config.cache.ttl_seconds = 0;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));

    let path = write_temp_config(r#"{ "sources": [ { "name": "Bad", "url": "ftp://example.com/feed" } ] }"#);
    let result = NewsConfig::from_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(NewsError::Config(_))));

    let path = write_temp_config("{ not json");
    let result = NewsConfig::from_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(NewsError::Serialization(_))));
}

#[test]
fn test_out_of_range_durations_are_rejected() {
    let mut config = NewsConfig::default();
    config.retention.retention_hours = i64::MAX;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));
    config.retention.retention_hours = MAX_RETENTION_HOURS;
    config.validate().unwrap();

    let mut config = NewsConfig::default();
    config.cache.ttl_seconds = i64::MAX;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));
    config.cache.ttl_seconds = MAX_TTL_SECONDS;
    config.validate().unwrap();

    let mut config = NewsConfig::default();
    config.classifier.breaking_window_hours = 0;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));
    config.classifier.breaking_window_hours = -3;
    assert!(matches!(config.validate(), Err(NewsError::Config(_))));

    let path = write_temp_config(r#"{ "retention": { "retention_hours": 9223372036854775807 } }"#);
    let result = NewsConfig::from_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(NewsError::Config(_))));
}
