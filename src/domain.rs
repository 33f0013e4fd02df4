use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::MiningError;

/// Entrez databases touched by a mining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Mesh,
    Gene,
    MedGen,
    Gtr,
    PubMed,
}

impl Database {
    /// Value of the `db=` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Database::Mesh => "mesh",
            Database::Gene => "gene",
            Database::MedGen => "medgen",
            Database::Gtr => "gtr",
            Database::PubMed => "pubmed",
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Database {
    type Err = MiningError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mesh" => Ok(Database::Mesh),
            "gene" => Ok(Database::Gene),
            "medgen" => Ok(Database::MedGen),
            "gtr" => Ok(Database::Gtr),
            "pubmed" => Ok(Database::PubMed),
            _ => Err(MiningError::InvalidDatabase(value.to_string())),
        }
    }
}

/// The three databases a run seeds candidate genes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Gene,
    #[value(name = "medgen")]
    MedGen,
    Gtr,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Gene, Source::MedGen, Source::Gtr];

    pub fn database(&self) -> Database {
        match self {
            Source::Gene => Database::Gene,
            Source::MedGen => Database::MedGen,
            Source::Gtr => Database::Gtr,
        }
    }

    /// Gene records are fetched in full; the others only ship a summary.
    pub fn uses_summary(&self) -> bool {
        !matches!(self, Source::Gene)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.database())
    }
}

impl FromStr for Source {
    type Err = MiningError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<Database>() {
            Ok(Database::Gene) => Ok(Source::Gene),
            Ok(Database::MedGen) => Ok(Source::MedGen),
            Ok(Database::Gtr) => Ok(Source::Gtr),
            _ => Err(MiningError::InvalidSource(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_database_names() {
        assert_eq!("MedGen".parse::<Database>().unwrap(), Database::MedGen);
        assert_eq!(Database::PubMed.to_string(), "pubmed");
        let err = "omim".parse::<Database>().unwrap_err();
        assert_matches!(err, MiningError::InvalidDatabase(_));
    }

    #[test]
    fn sources_reject_non_seeding_databases() {
        assert_eq!("gtr".parse::<Source>().unwrap(), Source::Gtr);
        let err = "pubmed".parse::<Source>().unwrap_err();
        assert_matches!(err, MiningError::InvalidSource(_));
    }

    #[test]
    fn only_gene_is_fetched_in_full() {
        assert!(!Source::Gene.uses_summary());
        assert!(Source::MedGen.uses_summary());
        assert!(Source::Gtr.uses_summary());
    }
}
