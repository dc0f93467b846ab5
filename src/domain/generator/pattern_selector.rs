use serde::Serialize;

use crate::domain::registry::node_registry::NodeRegistry;
use crate::error::{Error, Result};

/// Keyword group a description word can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordBucket {
    Triggers,
    Actions,
    Logic,
    Integrations,
    Data,
}

/// Fixed vocabularies; membership is a case-insensitive substring test against the description.
pub static VOCABULARY: [(KeywordBucket, &[&str]); 5] = [
    (KeywordBucket::Triggers, &["form", "webhook", "schedule", "manual", "email"]),
    (KeywordBucket::Actions, &["email", "slack", "api", "database", "crm"]),
    (KeywordBucket::Logic, &["if", "condition", "approve", "route", "check"]),
    (KeywordBucket::Integrations, &["hubspot", "salesforce", "sheets", "slack"]),
    (KeywordBucket::Data, &["process", "transform", "validate", "score"]),
];

/// Vocabulary words found in a description, grouped by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordBuckets {
    pub triggers: Vec<&'static str>,
    pub actions: Vec<&'static str>,
    pub logic: Vec<&'static str>,
    pub integrations: Vec<&'static str>,
    pub data: Vec<&'static str>,
}

impl KeywordBuckets {
    pub fn classify(description: &str) -> Self {
        let lowered = description.to_lowercase();
        let mut buckets = KeywordBuckets::default();

        for (bucket, words) in VOCABULARY.iter() {
            let found: Vec<&'static str> = words.iter().copied().filter(|word| lowered.contains(word)).collect();
            *buckets.bucket_mut(*bucket) = found;
        }

        buckets
    }

    pub fn bucket(&self, bucket: KeywordBucket) -> &[&'static str] {
        match bucket {
            KeywordBucket::Triggers => &self.triggers,
            KeywordBucket::Actions => &self.actions,
            KeywordBucket::Logic => &self.logic,
            KeywordBucket::Integrations => &self.integrations,
            KeywordBucket::Data => &self.data,
        }
    }

    fn bucket_mut(&mut self, bucket: KeywordBucket) -> &mut Vec<&'static str> {
        match bucket {
            KeywordBucket::Triggers => &mut self.triggers,
            KeywordBucket::Actions => &mut self.actions,
            KeywordBucket::Logic => &mut self.logic,
            KeywordBucket::Integrations => &mut self.integrations,
            KeywordBucket::Data => &mut self.data,
        }
    }

    pub fn has(&self, bucket: KeywordBucket) -> bool {
        !self.bucket(bucket).is_empty()
    }
}

/// One row of the decision table.
pub struct PatternRule {
    pub name: &'static str,
    pub matches: fn(&KeywordBuckets) -> bool,
    pub kinds: &'static [&'static str],
}

/// Ordered rule list; the first matching rule wins.
pub static PATTERN_RULES: [PatternRule; 3] = [
    PatternRule {
        name: "crm_routing",
        matches: |k| k.has(KeywordBucket::Logic) && k.has(KeywordBucket::Integrations),
        kinds: &["webhook", "function", "switch", "crm", "email"],
    },
    PatternRule {
        name: "data_action",
        matches: |k| k.has(KeywordBucket::Data) && k.has(KeywordBucket::Actions),
        kinds: &["webhook", "function", "http_request", "email"],
    },
    PatternRule {
        name: "approval",
        matches: |k| k.logic.contains(&"approve"),
        kinds: &["webhook", "function", "slack", "wait", "switch", "email"],
    },
];

pub const DEFAULT_PATTERN: (&str, &[&str]) = ("simple_automation", &["webhook", "function", "email"]);

/// The topology picked for a description: a named, ordered list of node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedPattern {
    pub name: &'static str,
    pub kinds: &'static [&'static str],
}

pub struct PatternSelector;

impl PatternSelector {
    /// Applies the decision table to already classified keywords.
    pub fn select(keywords: &KeywordBuckets) -> SelectedPattern {
        PATTERN_RULES
            .iter()
            .find(|rule| (rule.matches)(keywords))
            .map(|rule| SelectedPattern { name: rule.name, kinds: rule.kinds })
            .unwrap_or(SelectedPattern { name: DEFAULT_PATTERN.0, kinds: DEFAULT_PATTERN.1 })
    }

    pub fn select_for(description: &str) -> (KeywordBuckets, SelectedPattern) {
        let keywords = KeywordBuckets::classify(description);
        let pattern = Self::select(&keywords);
        log::debug!("Description matched pattern '{}' ({:?}).", pattern.name, keywords);
        (keywords, pattern)
    }

    /// Checks that every kind the decision table can emit is known to `registry`.
    pub fn verify_against(registry: &NodeRegistry) -> Result<()> {
        let all_kinds = PATTERN_RULES.iter().flat_map(|rule| rule.kinds.iter()).chain(DEFAULT_PATTERN.1.iter());

        for kind in all_kinds {
            if !registry.contains(kind) {
                return Err(Error::UnknownNodeKind(kind.to_string()));
            }
        }
        Ok(())
    }
}
