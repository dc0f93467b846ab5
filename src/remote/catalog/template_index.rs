use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::api::template_dto::{CatalogStats, TemplateCatalogDto, TemplateMatch, TemplateMetadata, TemplateRecordDto};
use crate::domain::services::template_search_trait::TemplateSearch;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

#[derive(Debug, Clone)]
struct IndexedTemplate {
    metadata: TemplateMetadata,
    terms: HashMap<String, f64>,
    norm: f64,
}

impl IndexedTemplate {
    fn new(metadata: TemplateMetadata) -> Self {
        let terms = term_counts(&searchable_text(&metadata));
        let norm = vector_norm(&terms);
        IndexedTemplate { metadata, terms, norm }
    }
}

/// In-process similarity index over template metadata.
///
/// Each template is embedded as lower-cased token counts of its title, description, domain,
/// tags and parameter types; queries are ranked by cosine similarity. Insertion order is kept
/// for listings and for breaking score ties.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex {
    templates: Vec<IndexedTemplate>,
}

impl TemplateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `records` with ids `w1..wN`.
    pub fn from_records(records: &[TemplateRecordDto]) -> Self {
        let templates = records
            .iter()
            .enumerate()
            .map(|(position, record)| IndexedTemplate::new(TemplateMetadata::from_record(format!("w{}", position + 1), record)))
            .collect();

        TemplateIndex { templates }
    }

    /// Reads a `{"workflows_metadata": [...]}` catalog file.
    pub fn load_catalog(path: impl AsRef<Path>) -> Result<Self> {
        let catalog: TemplateCatalogDto = parse_json_file(path.as_ref())?;
        log::info!("Loaded {} templates from '{}'.", catalog.workflows_metadata.len(), path.as_ref().display());
        Ok(Self::from_records(&catalog.workflows_metadata))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn in_domain<'a>(&'a self, domain: Option<&'a str>) -> impl Iterator<Item = &'a IndexedTemplate> + 'a {
        self.templates.iter().filter(move |template| domain.is_none_or(|domain| template.metadata.domain.eq_ignore_ascii_case(domain)))
    }
}

impl TemplateSearch for TemplateIndex {
    fn search(&self, query: &str, domain: Option<&str>, limit: usize) -> Result<Vec<TemplateMatch>> {
        let query_terms = term_counts(query);
        let query_norm = vector_norm(&query_terms);

        let mut matches: Vec<TemplateMatch> = self
            .in_domain(domain)
            .map(|template| {
                let distance = 1.0 - cosine_similarity(&query_terms, query_norm, &template.terms, template.norm);
                TemplateMatch { metadata: template.metadata.clone(), similarity_score: 1.0 - distance }
            })
            .collect();

        matches.sort_by(|a, b| b.similarity_score.partial_cmp(&a.similarity_score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }

    fn get_by_domain(&self, domain: &str) -> Result<Vec<TemplateMetadata>> {
        Ok(self.in_domain(Some(domain)).map(|template| template.metadata.clone()).collect())
    }

    fn get_all(&self) -> Result<Vec<TemplateMetadata>> {
        Ok(self.templates.iter().map(|template| template.metadata.clone()).collect())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<TemplateMetadata>> {
        Ok(self.templates.iter().find(|template| template.metadata.id == id).map(|template| template.metadata.clone()))
    }

    fn stats(&self) -> Result<CatalogStats> {
        let mut per_domain_counts: BTreeMap<String, usize> = BTreeMap::new();
        for template in &self.templates {
            *per_domain_counts.entry(template.metadata.domain.clone()).or_insert(0) += 1;
        }

        Ok(CatalogStats { total_count: self.templates.len(), per_domain_counts })
    }

    fn store(&mut self, id: &str, record: &TemplateRecordDto) -> Result<TemplateMetadata> {
        let indexed = IndexedTemplate::new(TemplateMetadata::from_record(id, record));
        let metadata = indexed.metadata.clone();

        match self.templates.iter_mut().find(|template| template.metadata.id == id) {
            Some(existing) => *existing = indexed,
            None => self.templates.push(indexed),
        }

        log::debug!("Stored template '{}' in domain {}.", metadata.title, metadata.domain);
        Ok(metadata)
    }
}

/// First of `domains` named as a whole word in `query`, ignoring case.
///
/// Unlike a plain substring test, a domain inside a longer word ("it" in "submit") does not count.
pub fn detect_domain<'a>(query: &str, domains: &'a [String]) -> Option<&'a str> {
    let words: Vec<String> = tokenize(query).collect();
    domains.iter().find(|domain| words.iter().any(|word| word.eq_ignore_ascii_case(domain))).map(String::as_str)
}

fn searchable_text(metadata: &TemplateMetadata) -> String {
    format!(
        "Title: {}\nDescription: {}\nDomain: {}\nTags: {}\nParameters: {}",
        metadata.title, metadata.description, metadata.domain, metadata.tags, metadata.parameter_types
    )
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric()).filter(|token| !token.is_empty()).map(str::to_lowercase)
}

fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

fn vector_norm(terms: &HashMap<String, f64>) -> f64 {
    terms.values().map(|count| count * count).sum::<f64>().sqrt()
}

fn cosine_similarity(a: &HashMap<String, f64>, a_norm: f64, b: &HashMap<String, f64>, b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }

    let dot: f64 = a.iter().filter_map(|(term, count)| b.get(term).map(|other| count * other)).sum();
    dot / (a_norm * b_norm)
}
