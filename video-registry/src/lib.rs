//! # Video Registry
//!
//! Polls the video catalog for newly published videos, stores them in
//! monthly OpenSearch partitions and serves list/search over HTTP.
//!
//! ## Architecture
//!
//! 1. **Catalog**: Fetches discovery pages and video details
//! 2. **Rotation**: Picks an API key that the catalog accepts
//! 3. **Discovery**: Runs the polling cycle and writes each video
//! 4. **API**: Serves reads through the registry service
//!
//! ## Modules
//!
//! - [`api`]: HTTP read endpoints
//! - [`catalog`]: Catalog interface and YouTube client
//! - [`config`]: Configuration and dependency initialization
//! - [`discovery`]: The polling loop
//! - [`errors`]: Error types for the catalog and ingest
//! - [`rotation`]: API key rotation

pub mod api;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod rotation;

pub use config::Dependencies;
pub use errors::{CatalogError, IngestError};

use thiserror::Error;

/// Errors that can occur during registry initialization or execution.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl RegistryError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}
