//! Error types for the oja memory service
//!
//! Absence of a record is never an error: lookups return `Option` or empty
//! collections. Errors cover validation, serialization, and the storage
//! layer, plus the standard envelope surfaced to the agent layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// The main error type for memory-service operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Storage Errors ==========
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    // ========== Serialization Errors ==========
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ========== Validation Errors ==========
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== IO Errors ==========
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for memory-service operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if this error was caused by invalid caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns true if this error came from the persistence layer
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::CollectionNotFound(_) | Error::Io(_)
        )
    }

    /// Wrap this error in the standard envelope for the given source
    pub fn to_envelope(&self, source: &str) -> ErrorEnvelope {
        ErrorEnvelope::new(source, self)
    }
}

/// Standard envelope for failures surfaced to the agent layer
///
/// Serializes as `{status: "error", source, data, message, timestamp}` with
/// a UTC ISO-8601 timestamp, rather than propagating raw store errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub status: String,
    pub source: String,
    pub data: Option<serde_json::Value>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    /// Wrap an error for the given source component, logging it on creation
    pub fn new(source: &str, error: &Error) -> Self {
        let envelope = Self {
            status: "error".to_string(),
            source: source.to_string(),
            data: None,
            message: error.to_string(),
            timestamp: Utc::now(),
        };
        tracing::error!("{}: {}", envelope.source, envelope.message);
        envelope
    }

    /// Builder: attach a structured payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
