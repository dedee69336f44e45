use thiserror::Error;

/// Errors emitted by the generation engine and placeholder handlers.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("placeholder handler failed: {0}")]
    Handler(String),
    #[error("asset error: {0}")]
    Asset(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}
