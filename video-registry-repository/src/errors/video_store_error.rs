//! Video store error types.
//!
//! This module defines the unified error type for all store operations,
//! including both low-level backend errors and read API validation errors.

use thiserror::Error;

/// Unified errors from video store operations.
///
/// Used by the `VideoStoreProvider` and `PartitionAdmin` traits and by
/// `VideoRegistryService`. A missing index on the read path is not an error:
/// providers report it as `Ok(None)`. On the write path it surfaces as
/// `IndexNotFound`.
#[derive(Debug, Clone, Error)]
pub enum VideoStoreError {
    /// Validation error (e.g., limit out of range, blank search text).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the store backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The target index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Failed to write a document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Failed to check for or create a partition.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to run a list or search query.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse a response from the store backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the store backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VideoStoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index-not-found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Returns true for caller mistakes rather than store failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}
