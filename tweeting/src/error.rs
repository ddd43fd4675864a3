//! Error types for the tweeting feed
//!
//! This module defines error types for each layer:
//! - `DomainError`: errors a feed store reports to the domain
//! - `FirestoreError`: Firestore REST client errors
//! - `ConfigError`: environment configuration errors
//! - `ParseError`: terminal command parsing errors

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Firestore REST API client errors
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Unauthorized - invalid or expired token")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<FirestoreError> for DomainError {
    fn from(e: FirestoreError) -> Self {
        match e {
            FirestoreError::NotFound(name) => DomainError::NotFound(name),
            FirestoreError::Deserialization(msg) => DomainError::Internal(msg),
            other => DomainError::Database(other.to_string()),
        }
    }
}

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Parse error for terminal commands
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing argument for: {0}")]
    MissingArgument(String),
}
