use crate::error::Result;

/// One request to a text-completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Black-box text completion. The returned text is expected to hold one JSON document,
/// optionally wrapped in a Markdown code fence.
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
