use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::error::MiningError;
use crate::state::{CandidateGenes, RunState, SeenSet};
use crate::vocabulary::Vocabulary;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const CANDIDATES_FILE: &str = "candidate_genes.json";
pub const VERIFIED_FILE: &str = "verified_genes.txt";
pub const SEEN_FILE: &str = "seen_ids.json";

/// Writes run collections under one directory. Every export replaces its
/// file with the current state.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: Utf8PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn export_vocabulary(&self, state: &RunState) -> Result<Utf8PathBuf, MiningError> {
        self.write_json(VOCABULARY_FILE, &state.vocabulary.terms())
    }

    pub fn export_candidates(&self, state: &RunState) -> Result<Utf8PathBuf, MiningError> {
        self.write_json(CANDIDATES_FILE, &state.candidates)
    }

    pub fn export_verified(&self, state: &RunState) -> Result<Utf8PathBuf, MiningError> {
        let mut content = String::new();
        for symbol in &state.verified {
            content.push_str(symbol);
            content.push('\n');
        }
        self.write_atomic(VERIFIED_FILE, content.as_bytes())
    }

    pub fn export_seen(&self, state: &RunState) -> Result<Utf8PathBuf, MiningError> {
        self.write_json(SEEN_FILE, &state.seen)
    }

    pub fn export_all(&self, state: &RunState) -> Result<Vec<Utf8PathBuf>, MiningError> {
        Ok(vec![
            self.export_vocabulary(state)?,
            self.export_candidates(state)?,
            self.export_verified(state)?,
            self.export_seen(state)?,
        ])
    }

    /// Rebuilds a run from earlier exports. Missing files leave their
    /// collection empty.
    pub fn load_state(&self) -> Result<RunState, MiningError> {
        let terms: Vec<String> = self.read_json(VOCABULARY_FILE)?.unwrap_or_default();
        let candidates: IndexMap<String, String> =
            self.read_json(CANDIDATES_FILE)?.unwrap_or_default();
        let seen: Vec<String> = self.read_json(SEEN_FILE)?.unwrap_or_default();
        let verified = match self.read_text(VERIFIED_FILE)? {
            Some(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        let mut state = RunState {
            vocabulary: Vocabulary::from_terms(terms),
            seen: seen.into_iter().collect::<SeenSet>(),
            candidates: candidates.into_iter().collect::<CandidateGenes>(),
            verified: Vec::new(),
        };
        for symbol in verified {
            state.push_verified(&symbol);
        }
        Ok(state)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<Utf8PathBuf, MiningError> {
        let mut content = serde_json::to_vec_pretty(value)
            .map_err(|err| MiningError::Export(format!("{name}: {err}")))?;
        content.push(b'\n');
        self.write_atomic(name, &content)
    }

    fn write_atomic(&self, name: &str, content: &[u8]) -> Result<Utf8PathBuf, MiningError> {
        let path = self.dir.join(name);
        fs::create_dir_all(self.dir.as_std_path())
            .map_err(|err| MiningError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".leader-genes")
            .tempfile_in(self.dir.as_std_path())
            .map_err(|err| MiningError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| MiningError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| MiningError::Filesystem(err.to_string()))?;
        info!(path = %path, bytes = content.len(), "exported");
        Ok(path)
    }

    fn read_text(&self, name: &str) -> Result<Option<String>, MiningError> {
        let path = self.dir.join(name);
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        fs::read_to_string(path.as_std_path())
            .map(Some)
            .map_err(|err| MiningError::Filesystem(format!("{path}: {err}")))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<Option<T>, MiningError> {
        let Some(text) = self.read_text(name)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| MiningError::Export(format!("{name}: {err}")))
    }
}
