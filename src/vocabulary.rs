use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::Database;
use crate::entrez::EntrezClient;
use crate::error::MiningError;
use crate::records::MeshSummary;
use crate::retrieval::{Pause, Retriever};

/// Lowercase phenotype synonyms and the disjunctive query built from them.
/// The user's own term always comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    query: String,
}

impl Vocabulary {
    pub fn build<I, S>(phenotype: &str, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = Vec::new();
        let phenotype = normalize(phenotype);
        if phenotype.is_empty() {
            return Self::default();
        }
        terms.push(phenotype);
        for synonym in synonyms {
            let synonym = normalize(synonym.as_ref());
            if !synonym.is_empty() && !terms.contains(&synonym) {
                terms.push(synonym);
            }
        }
        Self::from_terms(terms)
    }

    /// Rebuilds from an exported term list; the first entry is the phenotype.
    pub fn from_terms(terms: Vec<String>) -> Self {
        let query = terms.join(" OR ");
        Self { terms, query }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phenotype(&self) -> Option<&str> {
        self.terms.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Case-insensitive substring test against every term.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.iter().any(|term| text.contains(term.as_str()))
    }
}

/// Looks `phenotype` up in MeSH, keeping only the first hit, and builds the
/// vocabulary from its entry terms. An unknown phenotype yields an empty
/// vocabulary.
pub fn expand<C: EntrezClient, P: Pause>(
    retriever: &mut Retriever<C, P>,
    phenotype: &str,
) -> Result<Vocabulary, MiningError> {
    let phenotype = normalize(phenotype);
    if phenotype.is_empty() {
        warn!("empty phenotype");
        return Ok(Vocabulary::default());
    }

    let ids = retriever.search(Database::Mesh, &phenotype, 1)?;
    let Some(id) = ids.first() else {
        warn!(phenotype = phenotype.as_str(), "no MeSH record matches the phenotype");
        return Ok(Vocabulary::default());
    };

    let summary = MeshSummary::from_xml(&retriever.fetch_summary(Database::Mesh, id)?)?;
    let vocabulary = Vocabulary::build(&phenotype, &summary.terms);
    info!(mesh_id = id.as_str(), query = vocabulary.query(), "query translation");
    Ok(vocabulary)
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}
