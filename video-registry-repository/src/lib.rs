//! # Video Registry Repository
//!
//! This crate provides traits and implementations for storing and reading
//! ingested videos. It includes the error type, the store interfaces, monthly
//! partitioning, the query builder, and concrete implementations for
//! OpenSearch and for process memory.

pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod partition;
pub mod query;
pub mod service;
pub mod types;

pub use errors::VideoStoreError;
pub use interfaces::{PartitionAdmin, VideoStoreProvider};
pub use memory::InMemoryVideoStore;
pub use opensearch::OpenSearchProvider;
pub use partition::{PartitionManager, PartitionScheme, DEFAULT_ALIAS, DEFAULT_PARTITION_PREFIX};
pub use service::VideoRegistryService;
pub use types::{StoreHits, WriteOutcome, WriteResult};
