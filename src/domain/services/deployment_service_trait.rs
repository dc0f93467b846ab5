use serde_json::{Value, json};

use crate::api::deployment_dto::DeploymentOutcome;
use crate::domain::workflow::workflow::default_settings;

/// Remote workflow-execution server.
///
/// Every call reports failures as `DeploymentOutcome::Error`; nothing is retried.
pub trait DeploymentService: Send + Sync {
    /// Submits a new workflow. `payload` must already be stripped of server-assigned fields.
    fn create_workflow(&self, payload: &Value) -> DeploymentOutcome;

    fn update_workflow(&self, workflow_id: &str, payload: &Value) -> DeploymentOutcome;

    fn activate_workflow(&self, workflow_id: &str) -> DeploymentOutcome;

    fn execute_workflow(&self, workflow_id: &str, input: Option<Value>) -> DeploymentOutcome;
}

/// Fields the server assigns itself and rejects on create.
pub const READ_ONLY_FIELDS: [&str; 5] = ["active", "id", "createdAt", "updatedAt", "versionId"];

/// Shallow copy of `document` ready for submission: read-only fields removed, missing
/// `settings`, `staticData`, `connections` and `tags` filled with defaults.
pub fn prepare_payload(document: &Value) -> Value {
    let Some(fields) = document.as_object() else {
        return document.clone();
    };

    let mut payload = fields.clone();
    for field in READ_ONLY_FIELDS {
        payload.remove(field);
    }

    payload.entry("settings").or_insert_with(|| Value::Object(default_settings()));
    payload.entry("staticData").or_insert_with(|| json!({}));
    payload.entry("connections").or_insert_with(|| json!({}));
    payload.entry("tags").or_insert_with(|| json!([]));

    Value::Object(payload)
}
