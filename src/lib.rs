use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::generator::generator::WorkflowGenerator;
use crate::domain::generator::pattern_selector::PatternSelector;
use crate::domain::persistence::workflow_store::WorkflowStore;
use crate::domain::registry::node_registry::NodeRegistry;
use crate::domain::services::completion_service_trait::CompletionService;
use crate::domain::session::WorkflowSession;
use crate::error::Result;
use crate::remote::mistral::mistral_client::MistralClient;
use crate::remote::n8n::n8n_client::N8nClient;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;
pub mod remote;

/// Wires a session from configuration.
///
/// Model-assisted generation is enabled when a Mistral key is configured and `offline` is not
/// set; deployment is enabled when both n8n variables are present.
pub fn build_session(config: &AppConfig, offline: bool) -> Result<WorkflowSession> {
    let registry = Arc::new(NodeRegistry::standard());
    PatternSelector::verify_against(&registry)?;
    log::info!("Node registry ready with {} kinds.", registry.len());

    let completion: Option<Arc<dyn CompletionService>> = if offline {
        None
    } else {
        MistralClient::from_config(config)?.map(|client| Arc::new(client) as Arc<dyn CompletionService>)
    };
    if completion.is_none() {
        log::info!("Model-assisted generation disabled. Using pattern-based generation.");
    }

    let generator = WorkflowGenerator::new(registry, completion);
    let mut session = WorkflowSession::new(generator, WorkflowStore::new(&config.store_dir));

    if config.validate_for_deployment().is_ok() {
        session = session.with_deployer(Box::new(N8nClient::from_config(config)?));
    }

    Ok(session)
}
