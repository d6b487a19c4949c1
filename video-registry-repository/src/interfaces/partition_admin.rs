//! Partition administration trait definition.

use async_trait::async_trait;

use crate::errors::VideoStoreError;

/// Index-level operations needed to create monthly partitions lazily.
///
/// Implemented by every store backend and driven by `PartitionManager`.
#[async_trait]
pub trait PartitionAdmin: Send + Sync {
    /// Check whether a partition with this name exists.
    async fn partition_exists(&self, name: &str) -> Result<bool, VideoStoreError>;

    /// Create the partition with the fixed index settings and attach it to
    /// the read alias in the same request.
    ///
    /// Must succeed if another writer created the partition first.
    async fn create_partition(&self, name: &str) -> Result<(), VideoStoreError>;
}
