use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fmt;
use std::time::Duration;

use crate::api::completion_dto::{ChatCompletionRequestDto, ChatCompletionResponseDto, ChatMessageDto};
use crate::config::{AppConfig, mask_secret};
use crate::domain::services::completion_service_trait::{CompletionRequest, CompletionService};
use crate::error::{Error, Result};

pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Chat-completion client for the Mistral API.
#[derive(Clone)]
pub struct MistralClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl MistralClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = Client::builder().timeout(COMPLETION_TIMEOUT).build()?;

        Ok(MistralClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>> {
        match config.mistral_api_key.as_deref() {
            Some(api_key) => Ok(Some(Self::new(&config.mistral_base_url, api_key, &config.mistral_model)?)),
            None => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &CompletionRequest) -> ChatCompletionRequestDto {
        ChatCompletionRequestDto {
            model: self.model.clone(),
            messages: vec![ChatMessageDto::system(request.system.as_str()), ChatMessageDto::user(request.prompt.as_str())],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

impl fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralClient")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

impl CompletionService for MistralClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        tracing::info!("Requesting completion from model {}", self.model);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().unwrap_or_default();
            tracing::warn!("Completion request failed with HTTP {}", status);
            return Err(Error::RemoteError { status: status.as_u16(), message });
        }

        let body: ChatCompletionResponseDto = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| Error::CompletionError("response contained no choices".to_string()))?;

        tracing::debug!("Completion returned {} characters", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_both_messages() {
        let client = MistralClient::new("https://api.mistral.ai/", "key", "mistral-large-latest").unwrap();
        let body = client.request_body(&CompletionRequest {
            system: "be terse".to_string(),
            prompt: "make a workflow".to_string(),
            temperature: 0.3,
            max_tokens: 6000,
        });

        let encoded = serde_json::to_value(&body).unwrap();
        assert_eq!(encoded["model"], "mistral-large-latest");
        assert_eq!(encoded["messages"][0]["role"], "system");
        assert_eq!(encoded["messages"][1]["content"], "make a workflow");
        assert_eq!(encoded["max_tokens"], 6000);
        assert_eq!(client.base_url, "https://api.mistral.ai");
    }
}
