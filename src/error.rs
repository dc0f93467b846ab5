use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse workflow JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unknown node kind: '{0}'")]
    UnknownNodeKind(String),

    #[error("Completion service failed: {0}")]
    CompletionError(String),

    #[error("Model response could not be used as a workflow: {0}")]
    ModelResponseError(String),

    #[error("Remote service returned HTTP {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("Missing required configuration: {0}")]
    ConfigError(String),

    #[error("Workflow generation failed: {0}")]
    GenerationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
