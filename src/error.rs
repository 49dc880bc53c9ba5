//! Error types for the financial coach

use thiserror::Error;

/// Result type alias for coaching operations
pub type Result<T> = std::result::Result<T, CoachError>;

#[derive(Error, Debug)]
pub enum CoachError {

    // =============================
    // Input Errors
    // =============================

    /// Malformed input, rejected before the pipeline starts
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Output invariant violated: {0}")]
    Invariant(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoachError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
