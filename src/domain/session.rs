use serde_json::Value;

use crate::api::deployment_dto::DeploymentOutcome;
use crate::domain::generator::generator::WorkflowGenerator;
use crate::domain::persistence::workflow_store::{PersistedPaths, WorkflowStore};
use crate::domain::services::deployment_service_trait::{DeploymentService, prepare_payload};
use crate::domain::validator::{ValidationReport, WorkflowValidator};
use crate::domain::workflow::workflow::WorkflowDocument;
use crate::error::Result;

pub const NOTHING_TO_DEPLOY: &str = "No workflow available for deployment. Please generate a workflow first.";

/// What one `generate` call produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub document: WorkflowDocument,
    pub validation: ValidationReport,
    pub persisted: Option<PersistedPaths>,
}

/// One interactive session: generation, persistence and deployment around a single
/// "last generated" slot that each `generate` overwrites wholesale.
pub struct WorkflowSession {
    generator: WorkflowGenerator,
    store: WorkflowStore,
    deployer: Option<Box<dyn DeploymentService>>,
    last_generated: Option<WorkflowDocument>,
}

impl WorkflowSession {
    pub fn new(generator: WorkflowGenerator, store: WorkflowStore) -> Self {
        WorkflowSession { generator, store, deployer: None, last_generated: None }
    }

    pub fn with_deployer(mut self, deployer: Box<dyn DeploymentService>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    pub fn last_generated(&self) -> Option<&WorkflowDocument> {
        self.last_generated.as_ref()
    }

    /// Generates, validates and persists a document, then keeps it for deployment.
    pub fn generate(&mut self, description: &str) -> GenerationReport {
        let document = self.generator.generate(description);
        let validation = WorkflowValidator::validate_document(&document);

        if validation.valid {
            log::info!("Workflow '{}' is valid ({} nodes, {} connections).", document.name, validation.node_count, validation.connection_count);
        } else {
            log::warn!("Workflow '{}' has validation errors: {}", document.name, validation.errors.join("; "));
        }
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }

        let persisted = self.store.persist(&document);
        self.last_generated = Some(document.clone());

        GenerationReport { document, validation, persisted }
    }

    /// Puts an externally supplied document into the slot.
    pub fn adopt(&mut self, document: WorkflowDocument) -> ValidationReport {
        let validation = WorkflowValidator::validate_document(&document);
        self.last_generated = Some(document);
        validation
    }

    /// Loads the latest persisted document into the slot. Returns whether one was found.
    pub fn restore_latest(&mut self) -> Result<bool> {
        match self.store.load_latest()? {
            Some(document) => {
                log::info!("Restored workflow '{}' from '{}'.", document.name, self.store.latest_path().display());
                self.last_generated = Some(document);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Submits the slot's document. Refuses when the slot is empty or the document has errors.
    pub fn deploy(&self) -> DeploymentOutcome {
        let Some(document) = self.last_generated.as_ref() else {
            return DeploymentOutcome::error(NOTHING_TO_DEPLOY, None);
        };

        let Some(deployer) = self.deployer.as_ref() else {
            return DeploymentOutcome::error("No deployment service configured", None);
        };

        let document_value = match serde_json::to_value(document) {
            Ok(value) => value,
            Err(e) => return DeploymentOutcome::error(format!("Workflow could not be encoded: {}", e), None),
        };

        let validation = WorkflowValidator::validate(&document_value);
        if !validation.valid {
            return DeploymentOutcome::error(format!("Workflow has validation errors: {}", validation.errors.join("; ")), None);
        }

        let payload: Value = prepare_payload(&document_value);
        log::info!("Deploying '{}' ({} nodes, {} connections).", document.name, validation.node_count, validation.connection_count);

        let outcome = deployer.create_workflow(&payload);
        match &outcome {
            DeploymentOutcome::Success { id, .. } => log::info!("Deployed '{}' as {:?}.", document.name, id),
            DeploymentOutcome::Error { message, .. } => log::error!("Deployment of '{}' failed: {}", document.name, message),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_refuses_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let session = WorkflowSession::new(WorkflowGenerator::offline(), WorkflowStore::new(dir.path()));

        assert!(session.last_generated().is_none());
        assert_eq!(session.deploy(), DeploymentOutcome::error(NOTHING_TO_DEPLOY, None));
    }

    #[test]
    fn test_generate_fills_slot_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = WorkflowSession::new(WorkflowGenerator::offline(), WorkflowStore::new(dir.path()));

        let report = session.generate("Process customer feedback and send notifications");

        assert!(report.validation.valid);
        assert!(report.persisted.is_some());
        assert_eq!(session.last_generated(), Some(&report.document));
    }
}
