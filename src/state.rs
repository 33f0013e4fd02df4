use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::vocabulary::Vocabulary;

/// Record ids already evaluated in this run, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeenSet(IndexSet<String>);

impl SeenSet {
    /// Records `id` and reports whether it had been seen before.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        if self.0.contains(id) {
            return true;
        }
        self.0.insert(id.to_string());
        false
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Gene id to symbol for genes that passed source verification.
/// The first symbol recorded for an id is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateGenes(IndexMap<String, String>);

impl CandidateGenes {
    /// Returns `false` and leaves the map untouched if `id` is already present.
    pub fn insert(&mut self, id: &str, symbol: &str) -> bool {
        if self.0.contains_key(id) {
            return false;
        }
        self.0.insert(id.to_string(), symbol.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn symbol(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for CandidateGenes {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut genes = Self::default();
        for (id, symbol) in iter {
            genes.insert(&id, &symbol);
        }
        genes
    }
}

/// Everything one mining run accumulates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub vocabulary: Vocabulary,
    pub seen: SeenSet,
    pub candidates: CandidateGenes,
    pub verified: Vec<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Appends a cross-checked symbol once.
    pub fn push_verified(&mut self, symbol: &str) -> bool {
        if self.verified.iter().any(|known| known == symbol) {
            return false;
        }
        self.verified.push(symbol.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_everything() {
        let mut state = RunState::new();
        state.vocabulary = Vocabulary::build("asthma", ["bronchial asthma"]);
        state.seen.mark_seen("1");
        state.candidates.insert("1", "IL13");
        state.push_verified("IL13");

        state.reset();
        assert_eq!(state, RunState::default());
    }

    #[test]
    fn verified_list_keeps_order_without_repeats() {
        let mut state = RunState::new();
        assert!(state.push_verified("APOE"));
        assert!(state.push_verified("APP"));
        assert!(!state.push_verified("APOE"));
        assert_eq!(state.verified, vec!["APOE", "APP"]);
    }
}
