//! Known-good key cache with fall-through to the key pool.

use std::future::Future;

use tracing::{debug, error, info};

use crate::errors::CatalogError;
use crate::rotation::CredentialSource;

/// Runs catalog requests with the first API key that gets an answer.
///
/// The last key that worked is tried first. If it yields nothing, the whole
/// pool is loaded from the credential source and tried in load order, the
/// cached key included; the first key with a result becomes the new
/// known-good key. `CatalogError::Unavailable`
/// stops the attempt at once without touching the cache.
pub struct KeyRotation {
    source: Box<dyn CredentialSource>,
    known_good: Option<String>,
}

impl KeyRotation {
    pub fn new(source: Box<dyn CredentialSource>) -> Self {
        Self {
            source,
            known_good: None,
        }
    }

    /// Start with a key already known to work.
    pub fn with_known_good(mut self, key: impl Into<String>) -> Self {
        self.known_good = Some(key.into());
        self
    }

    pub fn known_good(&self) -> Option<&str> {
        self.known_good.as_deref()
    }

    /// Where new keys should be added, for operator-facing log lines.
    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// Run `request` with rotating keys.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(T))` - The first result any key produced
    /// * `Ok(None)` - Every key was refused
    /// * `Err(CatalogError)` - The catalog failed; the rotation was abandoned
    pub async fn with_rotation<T, F, Fut>(&mut self, mut request: F) -> Result<Option<T>, CatalogError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Option<T>, CatalogError>>,
    {
        if let Some(key) = self.known_good.clone() {
            if let Some(result) = request(key).await? {
                return Ok(Some(result));
            }
            debug!("Known-good API key produced no result, rotating");
        }

        let pool = self.source.load().await;
        for (position, key) in pool.into_iter().enumerate() {
            if let Some(result) = request(key.clone()).await? {
                info!(position = position, "Rotated to a new API key");
                self.known_good = Some(key);
                return Ok(Some(result));
            }
        }

        error!(
            source = %self.source.describe(),
            "No API key produced a result, add a new valid key"
        );
        Ok(None)
    }
}
