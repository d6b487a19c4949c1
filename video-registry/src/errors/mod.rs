//! Error types for the catalog client and the discovery loop.

use thiserror::Error;
use video_registry_repository::VideoStoreError;

/// Status used when the catalog could not be reached at all.
pub const SYNTHETIC_TIMEOUT_STATUS: u16 = 408;

/// Errors from talking to the video catalog.
///
/// A 4xx answer is not an error: it means "no result for this key" and is
/// reported as `Ok(None)` by the client so that key rotation can move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog answered 5xx or could not be reached in time.
    #[error("Catalog unavailable ({status}): {detail}")]
    Unavailable { status: u16, detail: String },

    /// The catalog answered 2xx with a body we could not decode.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The client could not be built.
    #[error("Client error: {0}")]
    ClientError(String),
}

impl CatalogError {
    /// Create an unavailable error with the upstream status.
    pub fn unavailable(status: u16, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            status,
            detail: detail.into(),
        }
    }

    /// Create an unavailable error for a timeout or connection failure.
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::unavailable(SYNTHETIC_TIMEOUT_STATUS, detail)
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a client error.
    pub fn client(msg: impl Into<String>) -> Self {
        Self::ClientError(msg.into())
    }
}

/// Errors that can occur while ingesting videos.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The catalog failed; ends the current cycle.
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    /// A store write failed; the document is skipped.
    #[error("Store error: {0}")]
    StoreError(#[from] VideoStoreError),
}
