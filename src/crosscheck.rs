//! Literature confirmation of candidate genes.
//!
//! A candidate is confirmed when one PubMed abstract mentions both its symbol
//! and a phenotype term. Only the first few hits are read: a real association
//! shows up near the top of the ranking.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::Database;
use crate::entrez::EntrezClient;
use crate::error::MiningError;
use crate::records::LiteratureArticle;
use crate::retrieval::{Pause, Retriever};
use crate::vocabulary::Vocabulary;

/// How the PubMed query for one gene is rendered.
///
/// Left unquoted, symbols such as `ENG` or `JUN` are read by PubMed as
/// language or date filters, so the default quotes the symbol and groups
/// the phenotype disjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheckQuery {
    pub field_tag: String,
    pub quote_symbol: bool,
    pub group_phenotype: bool,
}

impl Default for CrossCheckQuery {
    fn default() -> Self {
        Self {
            field_tag: "Title/Abstract".to_string(),
            quote_symbol: true,
            group_phenotype: true,
        }
    }
}

impl CrossCheckQuery {
    /// The phenotype query AND the gene symbol. The conjunction keeps PubMed
    /// from dropping the gene term when no article mentions it.
    pub fn render(&self, phenotype_query: &str, symbol: &str) -> String {
        let phenotype = if self.group_phenotype {
            format!("({phenotype_query})")
        } else {
            phenotype_query.to_string()
        };
        let symbol = symbol.trim().replace('"', "");
        let symbol = if self.quote_symbol {
            format!("\"{symbol}\"")
        } else {
            symbol
        };
        let tag = self.field_tag.trim();
        if tag.is_empty() {
            format!("{phenotype} AND {symbol}")
        } else {
            format!("{phenotype} AND {symbol}[{tag}]")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossCheckOutcome {
    pub symbol: String,
    pub verified: bool,
    /// Articles actually fetched and scanned.
    pub examined: usize,
    pub evidence: Option<String>,
}

/// True when one of the article's abstract sections names a phenotype term
/// and one (possibly another) names the symbol.
pub fn co_occurs(article: &LiteratureArticle, vocabulary: &Vocabulary, symbol: &str) -> bool {
    let symbol = symbol.to_lowercase();
    let mut term_seen = false;
    let mut gene_seen = false;
    for text in &article.abstracts {
        term_seen = term_seen || vocabulary.matches(text);
        gene_seen = gene_seen || text.to_lowercase().contains(&symbol);
        if term_seen && gene_seen {
            return true;
        }
    }
    false
}

pub fn cross_check<C: EntrezClient, P: Pause>(
    retriever: &mut Retriever<C, P>,
    vocabulary: &Vocabulary,
    symbol: &str,
    query: &CrossCheckQuery,
    limit: usize,
) -> Result<CrossCheckOutcome, MiningError> {
    if vocabulary.is_empty() {
        return Err(MiningError::EmptyQuery);
    }
    let mut outcome = CrossCheckOutcome {
        symbol: symbol.to_string(),
        verified: false,
        examined: 0,
        evidence: None,
    };
    if symbol.trim().is_empty() || limit == 0 {
        return Ok(outcome);
    }

    let term = query.render(vocabulary.query(), symbol);
    let mut ids = retriever.search(Database::PubMed, &term, limit)?;
    ids.truncate(limit);
    info!(symbol, articles = ids.len(), "cross-checking");

    // Literature ids stay out of the seen set: one article may confirm several genes.
    for id in &ids {
        let Some(xml) = retriever.fetch_full(Database::PubMed, id) else {
            warn!(symbol, pmid = id.as_str(), "article unavailable, skipped");
            continue;
        };
        outcome.examined += 1;
        let article = LiteratureArticle::from_xml(&xml)?;
        if co_occurs(&article, vocabulary, symbol) {
            debug!(symbol, pmid = id.as_str(), "co-occurrence found");
            outcome.verified = true;
            outcome.evidence = Some(id.clone());
            break;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_quotes_and_groups() {
        let query = CrossCheckQuery::default();
        assert_eq!(
            query.render("periodontitis OR chronic periodontitis", "ZNF579"),
            "(periodontitis OR chronic periodontitis) AND \"ZNF579\"[Title/Abstract]"
        );
    }

    #[test]
    fn legacy_rendering_is_available() {
        let query = CrossCheckQuery {
            field_tag: "Title/Abstract".to_string(),
            quote_symbol: false,
            group_phenotype: false,
        };
        assert_eq!(
            query.render("a OR b", "ENG"),
            "a OR b AND ENG[Title/Abstract]"
        );
    }

    #[test]
    fn co_occurrence_may_span_abstract_sections() {
        let vocabulary = Vocabulary::build("asthma", Vec::<String>::new());
        let article = LiteratureArticle {
            pmid: Some("1".to_string()),
            title: None,
            abstracts: vec![
                "BACKGROUND: Asthma is common.".to_string(),
                "RESULTS: il13 variants were enriched.".to_string(),
            ],
        };
        assert!(co_occurs(&article, &vocabulary, "IL13"));
        assert!(!co_occurs(&article, &vocabulary, "IL4"));
    }
}
