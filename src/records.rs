//! Typed views over the Entrez documents a run consumes.
//!
//! Every field is optional or a possibly empty list: Entrez omits sections
//! freely, and callers decide what a missing field means.

use crate::error::MiningError;
use crate::xml::Element;

/// `esearch` result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub count: Option<u64>,
    pub ids: Vec<String>,
    pub errors: Vec<String>,
}

impl SearchResult {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let count = root
            .find_children_of("eSearchResult", "Count")
            .first()
            .and_then(|count| count.text().parse().ok());
        let ids = root
            .find_children_of("IdList", "Id")
            .into_iter()
            .map(Element::text)
            .filter(|id| !id.is_empty())
            .collect();
        let mut errors: Vec<String> = root
            .find_all("ERROR")
            .into_iter()
            .map(Element::text)
            .collect();
        errors.extend(
            root.find_children_of("ErrorList", "PhraseNotFound")
                .into_iter()
                .map(|phrase| format!("phrase not found: {}", phrase.text())),
        );
        Ok(Self { count, ids, errors })
    }
}

/// MeSH `esummary` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshSummary {
    pub id: Option<String>,
    pub terms: Vec<String>,
}

impl MeshSummary {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let id = root
            .find_children_of("DocSum", "Id")
            .first()
            .map(|id| id.text());
        let terms = root
            .find_all("Item")
            .into_iter()
            .filter(|item| item.attr("Name") == Some("DS_MeshTerms"))
            .flat_map(|item| item.child_elements().map(Element::text))
            .filter(|term| !term.is_empty())
            .collect();
        Ok(Self { id, terms })
    }
}

/// Full `Entrezgene` record from `efetch db=gene`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneRecord {
    pub id: Option<String>,
    pub symbol: Option<String>,
    /// Headings of the record's commentary sections; the "Phenotypes"
    /// subsection lists its conditions here.
    pub phenotype_headings: Vec<String>,
}

impl GeneRecord {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let id = root
            .find("Gene-track_geneid")
            .map(Element::text)
            .filter(|id| !id.is_empty());
        // Interaction commentaries carry Gene-ref blocks of other genes, so
        // prefer the record's own Entrezgene_gene section.
        let symbol = root
            .find("Entrezgene_gene")
            .and_then(|gene| gene.find("Gene-ref_locus"))
            .or_else(|| root.find("Gene-ref_locus"))
            .map(Element::text)
            .filter(|symbol| !symbol.is_empty());
        let phenotype_headings = root
            .find_children_of("Gene-commentary", "Gene-commentary_heading")
            .into_iter()
            .map(Element::text)
            .collect();
        Ok(Self {
            id,
            symbol,
            phenotype_headings,
        })
    }
}

/// MedGen `esummary` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSummary {
    pub id: Option<String>,
    pub names: Vec<String>,
    pub gene_ids: Vec<String>,
}

impl ConditionSummary {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let id = root
            .find("DocumentSummary")
            .and_then(|doc| doc.attr("uid"))
            .map(str::to_string);

        let mut names = Vec::new();
        let mut gene_ids = Vec::new();
        collect_condition_fields(&root, &mut names, &mut gene_ids);

        // ConceptMeta ships its names and genes as escaped markup.
        for meta in root.find_all("ConceptMeta") {
            let payload = meta.text();
            if payload.is_empty() {
                continue;
            }
            match Element::parse_fragment(&payload) {
                Ok(embedded) => collect_condition_fields(&embedded, &mut names, &mut gene_ids),
                Err(err) => {
                    tracing::debug!(id = ?id, error = %err, "unreadable ConceptMeta payload");
                }
            }
        }

        Ok(Self {
            id,
            names,
            gene_ids: dedup(gene_ids),
        })
    }
}

fn collect_condition_fields(root: &Element, names: &mut Vec<String>, gene_ids: &mut Vec<String>) {
    names.extend(
        root.find_all("Name")
            .into_iter()
            .map(Element::text)
            .filter(|name| !name.is_empty()),
    );
    gene_ids.extend(
        root.find_all("Gene")
            .into_iter()
            .filter_map(|gene| gene.attr("gene_id"))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
    );
}

/// GTR `esummary` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub id: Option<String>,
    pub gene_ids: Vec<String>,
}

impl TestSummary {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let id = root
            .find("DocumentSummary")
            .and_then(|doc| doc.attr("uid"))
            .map(str::to_string);
        let gene_ids = root
            .find_all("GeneID")
            .into_iter()
            .map(Element::text)
            .filter(|id| !id.is_empty())
            .collect();
        Ok(Self {
            id,
            gene_ids: dedup(gene_ids),
        })
    }
}

/// PubMed article from `efetch db=pubmed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteratureArticle {
    pub pmid: Option<String>,
    pub title: Option<String>,
    pub abstracts: Vec<String>,
}

impl LiteratureArticle {
    pub fn from_xml(xml: &str) -> Result<Self, MiningError> {
        let root = Element::parse(xml)?;
        let pmid = root
            .find_children_of("MedlineCitation", "PMID")
            .first()
            .map(|pmid| pmid.text());
        let title = root
            .find("ArticleTitle")
            .map(Element::text)
            .filter(|title| !title.is_empty());
        let abstracts = root
            .find_all("AbstractText")
            .into_iter()
            .map(Element::text)
            .filter(|text| !text.is_empty())
            .collect();
        Ok(Self {
            pmid,
            title,
            abstracts,
        })
    }
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_reports_missing_phrases() {
        let xml = "<eSearchResult><Count>0</Count><RetMax>0</RetMax><IdList/>\
                   <ErrorList><PhraseNotFound>zzzq</PhraseNotFound></ErrorList></eSearchResult>";
        let result = SearchResult::from_xml(xml).unwrap();
        assert_eq!(result.count, Some(0));
        assert!(result.ids.is_empty());
        assert_eq!(result.errors, vec!["phrase not found: zzzq"]);
    }

    #[test]
    fn gene_symbol_prefers_own_reference() {
        let xml = "<Entrezgene-Set><Entrezgene>\
            <Entrezgene_track-info><Gene-track><Gene-track_geneid>7157</Gene-track_geneid></Gene-track></Entrezgene_track-info>\
            <Entrezgene_gene><Gene-ref><Gene-ref_locus>TP53</Gene-ref_locus></Gene-ref></Entrezgene_gene>\
            </Entrezgene></Entrezgene-Set>";
        let record = GeneRecord::from_xml(xml).unwrap();
        assert_eq!(record.id.as_deref(), Some("7157"));
        assert_eq!(record.symbol.as_deref(), Some("TP53"));
        assert!(record.phenotype_headings.is_empty());
    }

    #[test]
    fn gene_ids_are_deduplicated_in_order() {
        let xml = "<eSummaryResult><DocumentSummarySet><DocumentSummary uid=\"5\">\
            <GeneID>12</GeneID><GeneID>7</GeneID><GeneID>12</GeneID>\
            </DocumentSummary></DocumentSummarySet></eSummaryResult>";
        let summary = TestSummary::from_xml(xml).unwrap();
        assert_eq!(summary.id.as_deref(), Some("5"));
        assert_eq!(summary.gene_ids, vec!["12", "7"]);
    }
}
