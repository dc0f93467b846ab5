use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry of a template catalog file, with list-valued fields in structured form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecordDto {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub domain: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "parameter_types")]
    pub parameter_types: Vec<String>,
}

/// Root of a catalog file: `{"workflows_metadata": [...]}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TemplateCatalogDto {
    pub workflows_metadata: Vec<TemplateRecordDto>,
}

/// Stored metadata: list-valued fields are flattened to ", "-joined strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub tags: String,
    pub parameter_types: String,
}

pub const LIST_SEPARATOR: &str = ", ";

impl TemplateMetadata {
    pub fn from_record(id: impl Into<String>, record: &TemplateRecordDto) -> Self {
        TemplateMetadata {
            id: id.into(),
            title: record.title.clone(),
            description: record.description.clone(),
            domain: record.domain.clone(),
            tags: record.tags.join(LIST_SEPARATOR),
            parameter_types: record.parameter_types.join(LIST_SEPARATOR),
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        split_flattened(&self.tags)
    }

    pub fn parameter_type_list(&self) -> Vec<String> {
        split_flattened(&self.parameter_types)
    }
}

fn split_flattened(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|part| !part.is_empty()).map(str::to_string).collect()
}

/// A search hit: the stored metadata plus `1 - distance`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMatch {
    #[serde(flatten)]
    pub metadata: TemplateMetadata,
    pub similarity_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_count: usize,
    pub per_domain_counts: BTreeMap<String, usize>,
}
