use crate::api::template_dto::{CatalogStats, TemplateMatch, TemplateMetadata, TemplateRecordDto};
use crate::error::Result;

/// Similarity search over catalogued automation templates.
pub trait TemplateSearch {
    /// Best `limit` matches for `query`, most similar first, optionally restricted to one domain.
    fn search(&self, query: &str, domain: Option<&str>, limit: usize) -> Result<Vec<TemplateMatch>>;

    fn get_by_domain(&self, domain: &str) -> Result<Vec<TemplateMetadata>>;

    fn get_all(&self) -> Result<Vec<TemplateMetadata>>;

    fn get_by_id(&self, id: &str) -> Result<Option<TemplateMetadata>>;

    fn stats(&self) -> Result<CatalogStats>;

    /// Adds or replaces one record, returning its stored metadata.
    fn store(&mut self, id: &str, record: &TemplateRecordDto) -> Result<TemplateMetadata>;
}
