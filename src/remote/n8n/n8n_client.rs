use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;

use crate::api::deployment_dto::{CreatedWorkflowDto, DeploymentOutcome, WorkflowListDto, WorkflowSummaryDto};
use crate::config::AppConfig;
use crate::domain::services::deployment_service_trait::DeploymentService;
use crate::domain::workflow::workflow::WorkflowDocument;
use crate::error::{Error, Result};
use crate::remote::n8n::n8n_endpoint::N8nEndpoint;

pub const API_KEY_HEADER: &str = "x-n8n-api-key";
pub const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client for the n8n public REST API.
#[derive(Debug, Clone)]
pub struct N8nClient {
    base_url: String,
    client: Client,
    probe_client: Client,
}

impl N8nClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(api_key) = api_key {
            let value = HeaderValue::from_str(api_key).map_err(|e| Error::ConfigError(format!("N8N_API_KEY is not a valid header value: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder().default_headers(headers.clone()).timeout(timeout).build()?;
        let probe_client = Client::builder().default_headers(headers).timeout(CONNECTION_TEST_TIMEOUT).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        tracing::info!("n8n client initialised for {}", base_url);
        Ok(N8nClient { base_url, client, probe_client })
    }

    /// Requires `N8N_BASE_URL` and `N8N_API_KEY`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate_for_deployment()?;
        let base_url = config.n8n_base_url.as_deref().unwrap_or_default();
        Self::new(base_url, config.n8n_api_key.as_deref(), config.deploy_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn test_connection(&self) -> DeploymentOutcome {
        let endpoint = N8nEndpoint::ListWorkflows;
        match self.probe_client.request(endpoint.method(), endpoint.url(&self.base_url)).send() {
            Ok(response) if response.status().as_u16() == 200 => DeploymentOutcome::success(None, "Connected to n8n successfully"),
            Ok(response) => error_from_response(response),
            Err(e) => transport_error(e),
        }
    }

    pub fn list_workflows(&self) -> Result<Vec<WorkflowSummaryDto>> {
        let response = self.send(&N8nEndpoint::ListWorkflows, None)?;
        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().unwrap_or_default();
            return Err(Error::RemoteError { status, message });
        }

        let listing: WorkflowListDto = response.json()?;
        Ok(listing.data)
    }

    /// Public trigger URL of the document's first webhook node that declares a path.
    pub fn webhook_url(&self, document: &WorkflowDocument) -> Option<String> {
        let path = document.webhook_path()?;
        let separator = if path.starts_with('/') { "" } else { "/" };
        Some(format!("{}/webhook{}{}", self.base_url, separator, path))
    }

    fn send(&self, endpoint: &N8nEndpoint, body: Option<&Value>) -> Result<Response> {
        tracing::debug!("{} {}", endpoint.method(), endpoint.path());
        let request = self.client.request(endpoint.method(), endpoint.url(&self.base_url));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        Ok(request.send()?)
    }
}

impl DeploymentService for N8nClient {
    fn create_workflow(&self, payload: &Value) -> DeploymentOutcome {
        let name = payload.get("name").and_then(Value::as_str).unwrap_or("Generated Workflow");
        tracing::info!("Creating workflow '{}'", name);

        let response = match self.send(&N8nEndpoint::CreateWorkflow, Some(payload)) {
            Ok(response) => response,
            Err(e) => return outcome_from_error(e),
        };

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            return error_from_response(response);
        }

        match response.json::<CreatedWorkflowDto>() {
            Ok(created) => {
                let id = created.id_string();
                tracing::info!("Workflow '{}' created with id {:?}", name, id);
                DeploymentOutcome::success(id, format!("Workflow '{}' created successfully", name))
            }
            Err(e) => DeploymentOutcome::error(format!("Workflow created but the response could not be read: {}", e), Some(status)),
        }
    }

    fn update_workflow(&self, workflow_id: &str, payload: &Value) -> DeploymentOutcome {
        match self.send(&N8nEndpoint::UpdateWorkflow(workflow_id.to_string()), Some(payload)) {
            Ok(response) if response.status().as_u16() == 200 => DeploymentOutcome::success(Some(workflow_id.to_string()), "Workflow updated successfully"),
            Ok(response) => error_from_response(response),
            Err(e) => outcome_from_error(e),
        }
    }

    fn activate_workflow(&self, workflow_id: &str) -> DeploymentOutcome {
        match self.send(&N8nEndpoint::ActivateWorkflow(workflow_id.to_string()), None) {
            Ok(response) if response.status().as_u16() == 200 => DeploymentOutcome::success(Some(workflow_id.to_string()), "Workflow activated"),
            Ok(response) => error_from_response(response),
            Err(e) => outcome_from_error(e),
        }
    }

    fn execute_workflow(&self, workflow_id: &str, input: Option<Value>) -> DeploymentOutcome {
        let payload = match input {
            Some(data) => json!({ "workflowData": data }),
            None => json!({}),
        };

        match self.send(&N8nEndpoint::ExecuteWorkflow(workflow_id.to_string()), Some(&payload)) {
            Ok(response) if response.status().as_u16() == 201 => DeploymentOutcome::success(Some(workflow_id.to_string()), "Workflow execution started"),
            Ok(response) => error_from_response(response),
            Err(e) => outcome_from_error(e),
        }
    }
}

fn error_from_response(response: Response) -> DeploymentOutcome {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    tracing::warn!("n8n answered HTTP {}: {}", status, body);
    DeploymentOutcome::error(format!("HTTP {}: {}", status, body), Some(status))
}

fn outcome_from_error(error: Error) -> DeploymentOutcome {
    match error {
        Error::HttpError(e) => transport_error(e),
        other => DeploymentOutcome::error(other.to_string(), None),
    }
}

fn transport_error(error: reqwest::Error) -> DeploymentOutcome {
    tracing::error!("n8n request failed: {}", error);
    let message = if error.is_connect() {
        "Cannot connect to n8n. Is it running?".to_string()
    } else if error.is_timeout() {
        "Request to n8n timed out".to_string()
    } else {
        error.to_string()
    };
    DeploymentOutcome::error(message, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generator::strategy::MinimalStrategy;

    #[test]
    fn test_base_url_is_trimmed_and_webhook_url_derived() {
        let client = N8nClient::new("http://localhost:5678/", Some("key"), Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5678");

        let document = MinimalStrategy.fallback("anything");
        assert_eq!(client.webhook_url(&document).as_deref(), Some("http://localhost:5678/webhook/fallback-webhook"));
    }

    #[test]
    fn test_invalid_api_key_is_a_config_error() {
        let result = N8nClient::new("http://localhost:5678", Some("bad\nkey"), Duration::from_secs(1));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_unreachable_server_is_a_tagged_error() {
        // Port 9 (discard) is closed on test machines.
        let client = N8nClient::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();
        let outcome = client.create_workflow(&json!({ "name": "x" }));
        assert!(!outcome.is_success());
        assert_eq!(outcome.id(), None);
    }
}
