use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MiningError {
    #[error("an empty search cannot be performed; expand the phenotype vocabulary first")]
    #[diagnostic(help("the phenotype did not match any MeSH record"))]
    EmptyQuery,

    #[error("invalid Entrez database: {0}")]
    InvalidDatabase(String),

    #[error("invalid seeding source: {0}")]
    InvalidSource(String),

    #[error("Entrez request failed: {0}")]
    EntrezHttp(String),

    #[error("Entrez request timed out or could not connect: {0}")]
    EntrezTransient(String),

    #[error("Entrez returned status {status}: {message}")]
    EntrezStatus { status: u16, message: String },

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("missing config file at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read reference table {path}: {message}")]
    ReferenceTable { path: PathBuf, message: String },

    #[error("failed to export {0}")]
    Export(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
