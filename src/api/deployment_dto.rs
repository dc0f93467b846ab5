use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tagged result of every call against the execution server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeploymentOutcome {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        message: String,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl DeploymentOutcome {
    pub fn success(id: Option<String>, message: impl Into<String>) -> Self {
        Self::Success { id, message: message.into() }
    }

    pub fn error(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Error { message: message.into(), status_code }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Success { id, .. } => id.as_deref(),
            Self::Error { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Error { message, .. } => message,
        }
    }
}

/// Response of `POST /workflows` and `PUT /workflows/{id}`; only the id is of interest.
///
/// Older servers answer with numeric ids, newer ones with strings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWorkflowDto {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CreatedWorkflowDto {
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// One entry of the server's workflow listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummaryDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowListDto {
    pub data: Vec<WorkflowSummaryDto>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteWorkflowDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_data: Option<Value>,
}
