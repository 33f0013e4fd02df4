use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;
use leader_genes::config::{ConfigLoader, DEFAULT_ORGANISM};
use leader_genes::domain::Source;
use leader_genes::error::MiningError;

#[test]
fn explicit_file_overrides_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("custom.json");
    fs::write(
        &path,
        r#"{
            "entrez": { "base_url": "http://localhost:8080/eutils/", "email": "lab@example.org" },
            "sources": ["gtr", "gene", "gtr"],
            "retry": { "server_error_delay_secs": 2 },
            "cross_check": { "limit": 5, "quote_symbol": false }
        }"#,
    )
    .unwrap();

    let config = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(config.entrez.base_url, "http://localhost:8080/eutils");
    assert_eq!(config.entrez.email.as_deref(), Some("lab@example.org"));
    assert_eq!(config.sources, vec![Source::Gtr, Source::Gene]);
    assert_eq!(config.retry.server_error_delay, Duration::from_secs(2));
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.cross_check.limit, 5);
    assert!(!config.cross_check.query.quote_symbol);
    assert!(config.cross_check.query.group_phenotype);
    assert_eq!(config.organism, DEFAULT_ORGANISM);
}

#[test]
fn missing_explicit_file_is_an_error() {
    assert_matches!(
        ConfigLoader::resolve(Some("/nonexistent/leader-genes.json")),
        Err(MiningError::MissingConfig(_))
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(MiningError::ConfigParse(_))
    );
}
