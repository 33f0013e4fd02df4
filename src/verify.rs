//! Per-source relevance checks and gene extraction.

use tracing::{debug, warn};

use crate::domain::Source;
use crate::error::MiningError;
use crate::records::{ConditionSummary, GeneRecord, TestSummary};
use crate::reference::ReferenceTable;
use crate::vocabulary::Vocabulary;

/// A retrieved seeding record, tagged by the database it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRecord {
    Gene(GeneRecord),
    Condition(ConditionSummary),
    Test(TestSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    NotRelevant,
    /// The record is itself the gene.
    Gene { id: String, symbol: Option<String> },
    /// Associated genes whose symbols still have to be resolved.
    GeneIds(Vec<String>),
}

impl SourceRecord {
    pub fn parse(source: Source, xml: &str) -> Result<Self, MiningError> {
        Ok(match source {
            Source::Gene => SourceRecord::Gene(GeneRecord::from_xml(xml)?),
            Source::MedGen => SourceRecord::Condition(ConditionSummary::from_xml(xml)?),
            Source::Gtr => SourceRecord::Test(TestSummary::from_xml(xml)?),
        })
    }

    /// Decides whether the record concerns the phenotype and, if so, which
    /// genes it points at. `id` is the id the record was retrieved under.
    pub fn verify(
        &self,
        id: &str,
        vocabulary: &Vocabulary,
        reference: Option<&ReferenceTable>,
    ) -> Extraction {
        match self {
            SourceRecord::Gene(gene) => {
                let relevant = gene
                    .phenotype_headings
                    .iter()
                    .any(|heading| vocabulary.matches(heading));
                if !relevant {
                    return Extraction::NotRelevant;
                }
                Extraction::Gene {
                    id: gene.id.clone().unwrap_or_else(|| id.to_string()),
                    symbol: gene.symbol.clone(),
                }
            }
            SourceRecord::Condition(condition) => {
                if condition.names.iter().any(|name| vocabulary.matches(name)) {
                    Extraction::GeneIds(condition.gene_ids.clone())
                } else {
                    Extraction::NotRelevant
                }
            }
            SourceRecord::Test(test) => {
                let Some(reference) = reference else {
                    warn!(id, "no reference table loaded, cannot verify test");
                    return Extraction::NotRelevant;
                };
                match reference.mentions(id, vocabulary) {
                    Some(true) => Extraction::GeneIds(test.gene_ids.clone()),
                    Some(false) => Extraction::NotRelevant,
                    None => {
                        warn!(id, "test missing from reference table, it may be stale");
                        Extraction::NotRelevant
                    }
                }
            }
        }
    }
}

impl Extraction {
    pub fn is_relevant(&self) -> bool {
        !matches!(self, Extraction::NotRelevant)
    }

    pub fn log(&self, source: Source, id: &str) {
        match self {
            Extraction::NotRelevant => debug!(%source, id, "not relevant"),
            Extraction::Gene { id: gene_id, .. } => {
                debug!(%source, id, gene_id = gene_id.as_str(), "gene verified")
            }
            Extraction::GeneIds(ids) => debug!(%source, id, genes = ids.len(), "record verified"),
        }
    }
}
