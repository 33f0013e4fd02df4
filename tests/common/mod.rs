#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use leader_genes::config::{Config, ConfigLoader, ResolvedConfig};
use leader_genes::domain::Database;
use leader_genes::entrez::EntrezClient;
use leader_genes::error::MiningError;
use leader_genes::retrieval::Pause;

/// Entrez double answering from scripted responses and recording every call.
#[derive(Default)]
pub struct ScriptedEntrez {
    searches: HashMap<Database, Vec<String>>,
    search_failures: HashMap<Database, u16>,
    fetches: RefCell<HashMap<(Database, String), VecDeque<Result<String, u16>>>>,
    summaries: HashMap<(Database, String), String>,
    pub search_log: RefCell<Vec<(Database, String, usize)>>,
    pub fetch_log: RefCell<Vec<(Database, String)>>,
    pub summary_log: RefCell<Vec<(Database, String)>>,
}

impl ScriptedEntrez {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, db: Database, ids: &[&str]) -> Self {
        self.searches
            .insert(db, ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Every search against `db` answers with `status`.
    pub fn search_failure(mut self, db: Database, status: u16) -> Self {
        self.search_failures.insert(db, status);
        self
    }

    pub fn fetch(self, db: Database, id: &str, body: String) -> Self {
        self.fetch_sequence(db, id, vec![Ok(body)])
    }

    /// Responses served in order; the last one repeats.
    pub fn fetch_sequence(
        self,
        db: Database,
        id: &str,
        responses: Vec<Result<String, u16>>,
    ) -> Self {
        self.fetches
            .borrow_mut()
            .insert((db, id.to_string()), responses.into());
        self
    }

    pub fn summary(mut self, db: Database, id: &str, body: String) -> Self {
        self.summaries.insert((db, id.to_string()), body);
        self
    }

    pub fn fetch_count(&self, db: Database) -> usize {
        self.fetch_log
            .borrow()
            .iter()
            .filter(|(logged, _)| *logged == db)
            .count()
    }
}

impl EntrezClient for ScriptedEntrez {
    fn esearch(&self, db: Database, term: &str, retmax: usize) -> Result<String, MiningError> {
        self.search_log
            .borrow_mut()
            .push((db, term.to_string(), retmax));
        if let Some(status) = self.search_failures.get(&db) {
            return Err(MiningError::EntrezStatus {
                status: *status,
                message: "scripted search failure".to_string(),
            });
        }
        let ids = self.searches.get(&db).cloned().unwrap_or_default();
        Ok(esearch_xml(&ids))
    }

    fn efetch(&self, db: Database, id: &str) -> Result<String, MiningError> {
        self.fetch_log.borrow_mut().push((db, id.to_string()));
        let mut fetches = self.fetches.borrow_mut();
        let Some(queue) = fetches.get_mut(&(db, id.to_string())) else {
            return Err(MiningError::EntrezStatus {
                status: 404,
                message: format!("no scripted record {db}/{id}"),
            });
        };
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(MiningError::EntrezStatus {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(MiningError::EntrezHttp("empty script".to_string())),
        }
    }

    fn esummary(&self, db: Database, id: &str) -> Result<String, MiningError> {
        self.summary_log.borrow_mut().push((db, id.to_string()));
        self.summaries
            .get(&(db, id.to_string()))
            .cloned()
            .ok_or_else(|| MiningError::EntrezHttp(format!("no scripted summary {db}/{id}")))
    }
}

#[derive(Default)]
pub struct RecordingPause {
    pub pauses: RefCell<Vec<Duration>>,
}

impl RecordingPause {
    pub fn count(&self, duration: Duration) -> usize {
        self.pauses
            .borrow()
            .iter()
            .filter(|pause| **pause == duration)
            .count()
    }

    pub fn total(&self) -> usize {
        self.pauses.borrow().len()
    }
}

impl Pause for RecordingPause {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

pub fn test_config() -> ResolvedConfig {
    ConfigLoader::resolve_config(Config::default())
}

pub fn esearch_xml(ids: &[String]) -> String {
    let ids: String = ids.iter().map(|id| format!("<Id>{id}</Id>")).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\
         <eSearchResult><Count>{count}</Count><RetMax>{count}</RetMax><RetStart>0</RetStart>\
         <IdList>{ids}</IdList></eSearchResult>",
        count = ids.matches("<Id>").count()
    )
}

pub fn mesh_summary_xml(id: &str, terms: &[&str]) -> String {
    let items: String = terms
        .iter()
        .map(|term| format!("<Item Name=\"string\" Type=\"String\">{term}</Item>"))
        .collect();
    format!(
        "<eSummaryResult><DocSum><Id>{id}</Id>\
         <Item Name=\"DS_MeshTerms\" Type=\"List\">{items}</Item>\
         </DocSum></eSummaryResult>"
    )
}

pub fn gene_xml(id: &str, symbol: Option<&str>, headings: &[&str]) -> String {
    let symbol = symbol
        .map(|symbol| format!("<Gene-ref_locus>{symbol}</Gene-ref_locus>"))
        .unwrap_or_default();
    let comments: String = headings
        .iter()
        .map(|heading| {
            format!(
                "<Gene-commentary><Gene-commentary_type value=\"phenotype\">19</Gene-commentary_type>\
                 <Gene-commentary_heading>{heading}</Gene-commentary_heading></Gene-commentary>"
            )
        })
        .collect();
    format!(
        "<Entrezgene-Set><Entrezgene>\
         <Entrezgene_track-info><Gene-track><Gene-track_geneid>{id}</Gene-track_geneid></Gene-track></Entrezgene_track-info>\
         <Entrezgene_gene><Gene-ref>{symbol}</Gene-ref></Entrezgene_gene>\
         <Entrezgene_comments>{comments}</Entrezgene_comments>\
         </Entrezgene></Entrezgene-Set>"
    )
}

pub fn medgen_xml(uid: &str, names: &[&str], gene_ids: &[&str]) -> String {
    let names: String = names
        .iter()
        .map(|name| format!("<Name type=\"syn\">{name}</Name>"))
        .collect();
    let genes: String = gene_ids
        .iter()
        .map(|id| format!("<Gene gene_id=\"{id}\">G{id}</Gene>"))
        .collect();
    format!(
        "<eSummaryResult><DocumentSummarySet status=\"OK\"><DocumentSummary uid=\"{uid}\">\
         <Names>{names}</Names><Genes>{genes}</Genes>\
         </DocumentSummary></DocumentSummarySet></eSummaryResult>"
    )
}

pub fn gtr_xml(uid: &str, gene_ids: &[&str]) -> String {
    let genes: String = gene_ids
        .iter()
        .map(|id| format!("<Gene><GeneID>{id}</GeneID></Gene>"))
        .collect();
    format!(
        "<eSummaryResult><DocumentSummarySet status=\"OK\"><DocumentSummary uid=\"{uid}\">\
         <GeneData>{genes}</GeneData>\
         </DocumentSummary></DocumentSummarySet></eSummaryResult>"
    )
}

pub fn pubmed_xml(pmid: &str, abstracts: &[&str]) -> String {
    let texts: String = abstracts
        .iter()
        .map(|text| format!("<AbstractText>{text}</AbstractText>"))
        .collect();
    format!(
        "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID Version=\"1\">{pmid}</PMID>\
         <Article><ArticleTitle>Article {pmid}</ArticleTitle><Abstract>{texts}</Abstract></Article>\
         </MedlineCitation></PubmedArticle></PubmedArticleSet>"
    )
}
