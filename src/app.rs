use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ResolvedConfig;
use crate::crosscheck::{self, CrossCheckOutcome};
use crate::domain::{Database, Source};
use crate::entrez::EntrezClient;
use crate::error::MiningError;
use crate::export::Exporter;
use crate::records::GeneRecord;
use crate::reference::ReferenceTable;
use crate::retrieval::{Pause, Retriever, ThreadPause};
use crate::state::RunState;
use crate::verify::{Extraction, SourceRecord};
use crate::vocabulary;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cross_check: bool,
    pub export_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: Source,
    pub hits: usize,
    pub evaluated: usize,
    pub relevant: usize,
    pub genes_added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub phenotype: String,
    pub query: String,
    pub started_at: String,
    pub terms: Vec<String>,
    pub sources: Vec<SourceReport>,
    pub candidates: usize,
    pub cross_checks: Vec<CrossCheckOutcome>,
    pub verified: Vec<String>,
    pub requests: u64,
    pub exported: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Drives one mining run: vocabulary expansion, seeding, cross-check, export.
pub struct App<C: EntrezClient, P: Pause = ThreadPause> {
    retriever: Retriever<C, P>,
    config: ResolvedConfig,
    reference: Option<ReferenceTable>,
}

impl<C: EntrezClient, P: Pause> App<C, P> {
    pub fn new(client: C, pause: P, config: ResolvedConfig) -> Self {
        let retriever = Retriever::new(client, pause, config.retry, config.rate_limit);
        Self {
            retriever,
            config,
            reference: None,
        }
    }

    /// Uses `reference` instead of loading the configured table file.
    pub fn with_reference(mut self, reference: ReferenceTable) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Retriever<C, P> {
        &self.retriever
    }

    /// Fresh state for a new run; also restarts the request counter.
    pub fn begin_run(&mut self) -> RunState {
        self.retriever.reset();
        RunState::new()
    }

    pub fn reset(&mut self, state: &mut RunState) {
        self.retriever.reset();
        state.reset();
    }

    /// Fills `state.vocabulary`. Returns `false` when the phenotype matched
    /// no MeSH record; the vocabulary is then empty and seeding will refuse
    /// to run.
    pub fn expand_vocabulary(
        &mut self,
        state: &mut RunState,
        phenotype: &str,
        sink: &dyn ProgressSink,
    ) -> Result<bool, MiningError> {
        sink.event(ProgressEvent {
            message: format!("phase=Vocabulary; expanding {phenotype}"),
            elapsed: None,
        });
        state.vocabulary = vocabulary::expand(&mut self.retriever, phenotype)?;
        Ok(!state.vocabulary.is_empty())
    }

    /// Searches every configured source and records the genes that pass
    /// verification.
    pub fn seed(
        &mut self,
        state: &mut RunState,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<SourceReport>, MiningError> {
        if state.vocabulary.is_empty() {
            return Err(MiningError::EmptyQuery);
        }
        let sources = self.config.sources.clone();
        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            let start = Instant::now();
            sink.event(ProgressEvent {
                message: format!("phase=Seed; mining {source}"),
                elapsed: None,
            });
            let report = self.seed_source(state, source)?;
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Seed; {source} evaluated={} added={}",
                    report.evaluated, report.genes_added
                ),
                elapsed: Some(start.elapsed()),
            });
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn seed_source(
        &mut self,
        state: &mut RunState,
        source: Source,
    ) -> Result<SourceReport, MiningError> {
        if state.vocabulary.is_empty() {
            return Err(MiningError::EmptyQuery);
        }
        if source == Source::Gtr && self.reference.is_none() {
            let path = self.config.reference_table.clone();
            let table = ReferenceTable::load(path.as_std_path())?;
            if table.is_empty() {
                warn!(path = %path, "reference table is empty, no test can be verified");
            } else {
                info!(path = %path, tests = table.len(), "loaded reference table");
            }
            self.reference = Some(table);
        }

        let db = source.database();
        let query = match source {
            Source::Gene => format!("{} {}", state.vocabulary.query(), self.config.organism),
            Source::MedGen | Source::Gtr => state.vocabulary.query().to_string(),
        };
        let ids = self.retriever.search(db, &query, self.config.search_limit)?;
        info!(%source, hits = ids.len(), "mining");

        let mut report = SourceReport {
            source,
            hits: ids.len(),
            evaluated: 0,
            relevant: 0,
            genes_added: 0,
            skipped: 0,
        };

        for id in &ids {
            if state.seen.mark_seen(id) {
                continue;
            }
            report.evaluated += 1;
            let xml = if source.uses_summary() {
                self.retriever.fetch_summary(db, id)?
            } else {
                match self.retriever.fetch_full(db, id) {
                    Some(xml) => xml,
                    None => {
                        report.skipped += 1;
                        continue;
                    }
                }
            };

            let record = match SourceRecord::parse(source, &xml) {
                Ok(record) => record,
                Err(err) => {
                    warn!(%source, id = id.as_str(), error = %err, "unreadable record, skipped");
                    report.skipped += 1;
                    continue;
                }
            };
            let extraction = record.verify(id, &state.vocabulary, self.reference.as_ref());
            extraction.log(source, id);
            match extraction {
                Extraction::NotRelevant => {}
                Extraction::Gene {
                    id: gene_id,
                    symbol,
                } => {
                    report.relevant += 1;
                    match symbol {
                        Some(symbol) => {
                            if state.candidates.insert(&gene_id, &symbol) {
                                report.genes_added += 1;
                            }
                        }
                        None => {
                            warn!(
                                gene_id = gene_id.as_str(),
                                "gene record has no symbol, not inserted"
                            );
                        }
                    }
                }
                Extraction::GeneIds(gene_ids) => {
                    report.relevant += 1;
                    for gene_id in &gene_ids {
                        if self.resolve_gene(state, gene_id) {
                            report.genes_added += 1;
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// Fetches the gene record behind `gene_id` and records its symbol.
    /// Returns whether the candidate map grew. A record that cannot be
    /// fetched or read leaves the state untouched.
    fn resolve_gene(&mut self, state: &mut RunState, gene_id: &str) -> bool {
        if state.candidates.contains(gene_id) {
            return false;
        }
        let Some(xml) = self.retriever.fetch_full(Database::Gene, gene_id) else {
            return false;
        };
        let record = match GeneRecord::from_xml(&xml) {
            Ok(record) => record,
            Err(err) => {
                warn!(gene_id, error = %err, "unreadable gene record, skipped");
                return false;
            }
        };
        state.seen.mark_seen(gene_id);
        match record.symbol {
            Some(symbol) => state.candidates.insert(gene_id, &symbol),
            None => {
                warn!(gene_id, "gene record has no symbol, invalid id?");
                false
            }
        }
    }

    /// Looks for literature confirming `symbol`. The caller decides whether
    /// to record a positive outcome.
    pub fn cross_check(
        &mut self,
        state: &RunState,
        symbol: &str,
    ) -> Result<CrossCheckOutcome, MiningError> {
        crosscheck::cross_check(
            &mut self.retriever,
            &state.vocabulary,
            symbol,
            &self.config.cross_check.query,
            self.config.cross_check.limit,
        )
    }

    /// Cross-checks every candidate in insertion order and appends the
    /// confirmed symbols to `state.verified`.
    pub fn cross_check_all(
        &mut self,
        state: &mut RunState,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<CrossCheckOutcome>, MiningError> {
        if state.vocabulary.is_empty() {
            return Err(MiningError::EmptyQuery);
        }
        let symbols: Vec<String> = state.candidates.symbols().map(str::to_string).collect();
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            sink.event(ProgressEvent {
                message: format!("phase=CrossCheck; {symbol}"),
                elapsed: None,
            });
            let outcome = self.cross_check(state, &symbol)?;
            if outcome.verified {
                state.push_verified(&symbol);
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// A complete run from phenotype to exported files.
    pub fn run(
        &mut self,
        phenotype: &str,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<(RunState, RunSummary), MiningError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let mut state = self.begin_run();

        if !self.expand_vocabulary(&mut state, phenotype, sink)? {
            warn!(phenotype, "invalid search term");
        }
        let sources = self.seed(&mut state, sink)?;
        let exporter = options.export_dir.clone().map(Exporter::new);

        // Seeding results are on disk before the cross-check starts, so a
        // failed cross-check can be resumed from them.
        if let Some(exporter) = &exporter {
            Self::export(exporter, &state, sink)?;
        }
        let cross_checks = if options.cross_check {
            self.cross_check_all(&mut state, sink)?
        } else {
            Vec::new()
        };

        let exported = match &exporter {
            Some(exporter) => Self::export(exporter, &state, sink)?,
            None => Vec::new(),
        };

        let summary = self.summarize(&state, started_at, sources, cross_checks, exported);
        Ok((state, summary))
    }

    fn export(
        exporter: &Exporter,
        state: &RunState,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<String>, MiningError> {
        sink.event(ProgressEvent {
            message: format!("phase=Export; writing {}", exporter.dir()),
            elapsed: None,
        });
        Ok(exporter
            .export_all(state)?
            .into_iter()
            .map(|path| path.to_string())
            .collect())
    }

    pub fn summarize(
        &self,
        state: &RunState,
        started_at: String,
        sources: Vec<SourceReport>,
        cross_checks: Vec<CrossCheckOutcome>,
        exported: Vec<String>,
    ) -> RunSummary {
        RunSummary {
            phenotype: state.vocabulary.phenotype().unwrap_or_default().to_string(),
            query: state.vocabulary.query().to_string(),
            started_at,
            terms: state.vocabulary.terms().to_vec(),
            sources,
            candidates: state.candidates.len(),
            cross_checks,
            verified: state.verified.clone(),
            requests: self.retriever.processed(),
            exported,
        }
    }
}
