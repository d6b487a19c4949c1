//! Monthly partition naming and lazy creation.
//!
//! Every write goes to the partition of the current calendar month
//! (`{prefix}_{year}_{month}`, month without zero padding). The partition is
//! created on the first write that lands in it and is attached to the read
//! alias at creation time. Partitions are never deleted here.

use chrono::{DateTime, Datelike, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::VideoStoreError;
use crate::interfaces::PartitionAdmin;

/// Default partition name prefix.
pub const DEFAULT_PARTITION_PREFIX: &str = "videos";

/// Default read alias spanning every partition.
pub const DEFAULT_ALIAS: &str = "videos";

/// Naming scheme for partitions and the alias that spans them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionScheme {
    /// Prefix of every partition name.
    pub prefix: String,
    /// The alias name used for all reads.
    pub alias: String,
}

impl Default for PartitionScheme {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_PREFIX, DEFAULT_ALIAS)
    }
}

impl PartitionScheme {
    pub fn new(prefix: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            alias: alias.into(),
        }
    }

    /// Partition name for the month containing `at`.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use video_registry_repository::PartitionScheme;
    ///
    /// let scheme = PartitionScheme::new("videos", "videos");
    /// let at = Utc.with_ymd_and_hms(2021, 6, 15, 0, 0, 0).unwrap();
    /// assert_eq!(scheme.partition_name(at), "videos_2021_6");
    /// ```
    pub fn partition_name(&self, at: DateTime<Utc>) -> String {
        format!("{}_{}_{}", self.prefix, at.year(), at.month())
    }
}

/// Resolves the write partition and makes sure it exists.
///
/// Holds a single-slot cache of the last partition known to exist, so the
/// existence check costs one round-trip per month rather than one per write.
/// The cache lock is held across the check, which serializes concurrent
/// writers on a month boundary.
pub struct PartitionManager {
    scheme: PartitionScheme,
    current: Mutex<Option<String>>,
}

impl PartitionManager {
    pub fn new(scheme: PartitionScheme) -> Self {
        Self {
            scheme,
            current: Mutex::new(None),
        }
    }

    pub fn scheme(&self) -> &PartitionScheme {
        &self.scheme
    }

    /// The partition currently cached as existing, if any.
    pub async fn current(&self) -> Option<String> {
        self.current.lock().await.clone()
    }

    /// Resolve the partition for the current wall-clock time.
    pub async fn resolve_write_partition<A>(&self, admin: &A) -> Result<String, VideoStoreError>
    where
        A: PartitionAdmin + ?Sized,
    {
        self.resolve_write_partition_at(admin, Utc::now()).await
    }

    /// Resolve the partition for `now`, creating it if it does not exist.
    pub async fn resolve_write_partition_at<A>(
        &self,
        admin: &A,
        now: DateTime<Utc>,
    ) -> Result<String, VideoStoreError>
    where
        A: PartitionAdmin + ?Sized,
    {
        let name = self.scheme.partition_name(now);
        let mut current = self.current.lock().await;

        if current.as_deref() == Some(name.as_str()) {
            return Ok(name);
        }

        if admin.partition_exists(&name).await? {
            info!(partition = %name, "Partition already exists, not creating it");
        } else {
            admin.create_partition(&name).await?;
            info!(partition = %name, alias = %self.scheme.alias, "Created partition");
        }

        debug!(previous = ?*current, partition = %name, "Caching write partition");
        *current = Some(name.clone());
        Ok(name)
    }
}
