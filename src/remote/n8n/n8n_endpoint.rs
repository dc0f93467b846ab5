use reqwest::Method;

/// Routes of the execution server's public REST API, relative to `{base}/api/v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum N8nEndpoint {
    ListWorkflows,
    CreateWorkflow,
    UpdateWorkflow(String),
    ActivateWorkflow(String),
    ExecuteWorkflow(String),
}

impl N8nEndpoint {
    pub const API_PREFIX: &'static str = "/api/v1";

    pub fn path(&self) -> String {
        match self {
            Self::ListWorkflows | Self::CreateWorkflow => "/workflows".to_string(),
            Self::UpdateWorkflow(id) => format!("/workflows/{}", id),
            Self::ActivateWorkflow(id) => format!("/workflows/{}/activate", id),
            Self::ExecuteWorkflow(id) => format!("/workflows/{}/execute", id),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::ListWorkflows => Method::GET,
            Self::UpdateWorkflow(_) => Method::PUT,
            Self::CreateWorkflow | Self::ActivateWorkflow(_) | Self::ExecuteWorkflow(_) => Method::POST,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}{}", base_url, Self::API_PREFIX, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(N8nEndpoint::CreateWorkflow.url("http://localhost:5678"), "http://localhost:5678/api/v1/workflows");
        assert_eq!(N8nEndpoint::ActivateWorkflow("7".to_string()).path(), "/workflows/7/activate");
        assert_eq!(N8nEndpoint::UpdateWorkflow("7".to_string()).method(), Method::PUT);
        assert_eq!(N8nEndpoint::ListWorkflows.method(), Method::GET);
    }
}
