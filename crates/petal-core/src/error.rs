//! Error types for Petal

/// Result type alias using Petal's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers for any malformed feature input
pub const VALIDATION_MESSAGE: &str =
    "Invalid data provided. Expected 4 numeric values separated by commas.";

/// Core error type for Petal operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model artifact could not be loaded
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Request input failed validation; the message is safe to show callers
    #[error("{0}")]
    Validation(String),

    /// Inference was requested before the model reached the ready state
    #[error("model not ready")]
    NotReady,

    /// The inference runtime failed while running the model
    #[error("inference error: {0}")]
    Inference(String),

    /// The model produced outputs that break its declared contract
    #[error("model contract violation: {0}")]
    ModelContract(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create the validation error for malformed feature input
    pub fn invalid_input() -> Self {
        Self::Validation(VALIDATION_MESSAGE.to_string())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new model contract error
    pub fn model_contract(msg: impl Into<String>) -> Self {
        Self::ModelContract(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by the caller rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
