//! Local GTR test-to-condition table.
//!
//! The GTR summaries carry no condition text we can rely on, so relevance is
//! decided from NCBI's `test_condition_gene.txt` export. The file has to be
//! refreshed out of band; ids missing from it are reported as stale.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use flate2::read::GzDecoder;
use regex::Regex;

use crate::error::MiningError;
use crate::vocabulary::Vocabulary;

static TEST_ACCESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GTR0*(\d+)(?:\.\d+)?$").expect("valid GTR accession regex")
});

#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    lines: HashMap<String, Vec<String>>,
}

impl ReferenceTable {
    pub fn load(path: &Path) -> Result<Self, MiningError> {
        let map_err = |err: std::io::Error| MiningError::ReferenceTable {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let file = File::open(path).map_err(map_err)?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let mut table = Self::default();
        for line in BufReader::new(reader).lines() {
            table.add_line(&line.map_err(map_err)?);
        }
        Ok(table)
    }

    pub fn from_text(text: &str) -> Self {
        let mut table = Self::default();
        for line in text.lines() {
            table.add_line(line);
        }
        table
    }

    fn add_line(&mut self, line: &str) {
        if line.starts_with('#') || line.trim().is_empty() {
            return;
        }
        // Gene and concept ids are numeric too; only the leading id names the test.
        let key = if line.contains('\t') {
            line.split('\t').find_map(test_id)
        } else {
            line.split_whitespace().find_map(test_id)
        };
        if let Some(key) = key {
            self.lines.entry(key).or_default().push(line.to_lowercase());
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lowercased lines describing test `id`.
    pub fn descriptions(&self, id: &str) -> Option<&[String]> {
        self.lines.get(id.trim()).map(Vec::as_slice)
    }

    /// `None` when the table has no line for `id`.
    pub fn mentions(&self, id: &str, vocabulary: &Vocabulary) -> Option<bool> {
        self.descriptions(id)
            .map(|lines| lines.iter().any(|line| vocabulary.matches(line)))
    }
}

/// Normalizes a field that names a GTR test: a bare numeric id or a
/// `GTR000012345.1` accession.
fn test_id(field: &str) -> Option<String> {
    let field = field.trim();
    if !field.is_empty() && field.chars().all(|ch| ch.is_ascii_digit()) {
        return Some(field.trim_start_matches('0').to_string()).filter(|id| !id.is_empty());
    }
    TEST_ACCESSION
        .captures(field)
        .map(|caps| caps[1].to_string())
}
