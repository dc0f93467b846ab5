use std::sync::Arc;

use crate::domain::generator::strategy::{GenerationStrategy, MinimalStrategy, ModelAssistedStrategy, PatternStrategy};
use crate::domain::registry::node_registry::NodeRegistry;
use crate::domain::services::completion_service_trait::CompletionService;
use crate::domain::workflow::workflow::WorkflowDocument;

/// Runs generation strategies in order until one yields a document.
///
/// The minimal strategy is not part of the list: it runs after every listed strategy has
/// failed, so `generate` always returns a structurally complete document.
pub struct WorkflowGenerator {
    strategies: Vec<Box<dyn GenerationStrategy>>,
    last_resort: MinimalStrategy,
}

impl WorkflowGenerator {
    /// Model-assisted generation first when a completion service is configured, then the pattern path.
    pub fn new(registry: Arc<NodeRegistry>, completion: Option<Arc<dyn CompletionService>>) -> Self {
        let mut strategies: Vec<Box<dyn GenerationStrategy>> = Vec::new();

        if let Some(service) = completion {
            strategies.push(Box::new(ModelAssistedStrategy::new(service, registry.clone())));
        }
        strategies.push(Box::new(PatternStrategy::new(registry)));

        Self::with_strategies(strategies)
    }

    /// Pattern path only.
    pub fn offline() -> Self {
        Self::new(Arc::new(NodeRegistry::standard()), None)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn GenerationStrategy>>) -> Self {
        WorkflowGenerator { strategies, last_resort: MinimalStrategy }
    }

    pub fn generate(&self, description: &str) -> WorkflowDocument {
        for strategy in &self.strategies {
            match strategy.produce(description) {
                Ok(document) => {
                    log::info!("Generated workflow '{}' with the {} strategy.", document.name, strategy.kind());
                    return document;
                }
                Err(e) => log::warn!("The {} strategy failed: {}. Falling back.", strategy.kind(), e),
            }
        }

        log::warn!("All generation strategies failed. Producing the minimal fallback workflow.");
        self.last_resort.fallback(description)
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::completion_service_trait::CompletionRequest;
    use crate::domain::workflow::workflow::GeneratorKind;
    use crate::error::{Error, Result};

    struct Unreachable;

    impl CompletionService for Unreachable {
        fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(Error::CompletionError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_offline_generator_uses_pattern_path() {
        let generator = WorkflowGenerator::offline();
        assert_eq!(generator.strategy_count(), 1);
        assert_eq!(generator.generate("Hello world").generator(), Some(GeneratorKind::Pattern));
    }

    #[test]
    fn test_failed_completion_falls_back_to_pattern() {
        let registry = Arc::new(NodeRegistry::standard());
        let generator = WorkflowGenerator::new(registry, Some(Arc::new(Unreachable)));

        assert_eq!(generator.strategy_count(), 2);
        assert_eq!(generator.generate("Route leads to Salesforce").generator(), Some(GeneratorKind::Pattern));
    }

    #[test]
    fn test_empty_strategy_list_yields_minimal_document() {
        let document = WorkflowGenerator::with_strategies(Vec::new()).generate("anything");
        assert_eq!(document.generator(), Some(GeneratorKind::Minimal));
        assert_eq!(document.nodes.len(), 2);
    }
}
