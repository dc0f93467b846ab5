use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessageDto {
    pub role: String,
    pub content: String,
}

impl ChatMessageDto {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessageDto { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessageDto { role: "user".to_string(), content: content.into() }
    }
}

/// Body of a chat completion request.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatCompletionRequestDto {
    pub model: String,
    pub messages: Vec<ChatMessageDto>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatCompletionResponseDto {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<ChatChoiceDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatChoiceDto {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessageDto,

    #[serde(default)]
    pub finish_reason: Option<String>,
}
