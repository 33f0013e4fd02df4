mod common;

use leader_genes::crosscheck::{CrossCheckQuery, cross_check};
use leader_genes::domain::Database;
use leader_genes::retrieval::{RateLimit, RetryPolicy, Retriever};
use leader_genes::vocabulary::Vocabulary;

use common::{RecordingPause, ScriptedEntrez, pubmed_xml};

const NOISE: &str = "Unrelated cohort study of dietary habits.";
const HIT: &str = "ZNF579 expression was elevated in chronic periodontitis.";

/// Twelve ranked articles; only `matching` mentions gene and phenotype together.
fn literature(matching: usize) -> ScriptedEntrez {
    let ids: Vec<String> = (0..12).map(|n| format!("{}", 40_000 + n)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut client = ScriptedEntrez::new().search(Database::PubMed, &id_refs);
    for (n, id) in ids.iter().enumerate() {
        let text = if n == matching { HIT } else { NOISE };
        client = client.fetch(Database::PubMed, id, pubmed_xml(id, &[text]));
    }
    client
}

fn retriever(client: ScriptedEntrez) -> Retriever<ScriptedEntrez, RecordingPause> {
    Retriever::new(
        client,
        RecordingPause::default(),
        RetryPolicy::default(),
        RateLimit::default(),
    )
}

fn vocabulary() -> Vocabulary {
    Vocabulary::build("periodontitis", ["chronic periodontitis"])
}

#[test]
fn match_beyond_the_limit_is_not_seen() {
    let mut retriever = retriever(literature(10));
    let outcome = cross_check(
        &mut retriever,
        &vocabulary(),
        "ZNF579",
        &CrossCheckQuery::default(),
        10,
    )
    .unwrap();

    assert!(!outcome.verified);
    assert_eq!(outcome.examined, 10);
    assert_eq!(retriever.client().fetch_count(Database::PubMed), 10);
}

#[test]
fn match_within_the_limit_confirms() {
    let mut retriever = retriever(literature(9));
    let outcome = cross_check(
        &mut retriever,
        &vocabulary(),
        "ZNF579",
        &CrossCheckQuery::default(),
        10,
    )
    .unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.evidence.as_deref(), Some("40009"));
    assert_eq!(retriever.client().fetch_count(Database::PubMed), 10);
}

#[test]
fn stops_at_first_confirming_article() {
    let mut retriever = retriever(literature(2));
    let outcome = cross_check(
        &mut retriever,
        &vocabulary(),
        "ZNF579",
        &CrossCheckQuery::default(),
        10,
    )
    .unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.examined, 3);
}

#[test]
fn search_combines_phenotype_and_symbol() {
    let mut retriever = retriever(literature(0));
    cross_check(
        &mut retriever,
        &vocabulary(),
        "ZNF579",
        &CrossCheckQuery::default(),
        10,
    )
    .unwrap();

    let log = retriever.client().search_log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, Database::PubMed);
    assert_eq!(
        log[0].1,
        "(periodontitis OR chronic periodontitis) AND \"ZNF579\"[Title/Abstract]"
    );
    assert_eq!(log[0].2, 10);
}

#[test]
fn unavailable_articles_are_skipped() {
    let client = ScriptedEntrez::new()
        .search(Database::PubMed, &["1", "2"])
        .fetch_sequence(Database::PubMed, "1", vec![Err(500)])
        .fetch(Database::PubMed, "2", pubmed_xml("2", &[HIT]));
    let mut retriever = retriever(client);
    let outcome = cross_check(
        &mut retriever,
        &vocabulary(),
        "ZNF579",
        &CrossCheckQuery::default(),
        10,
    )
    .unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.examined, 1);
    assert_eq!(outcome.evidence.as_deref(), Some("2"));
}
