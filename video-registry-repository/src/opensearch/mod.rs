//! OpenSearch implementation of the video store provider.
//!
//! This module provides a concrete implementation of `VideoStoreProvider`
//! and `PartitionAdmin` using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::{get_index_settings, NUMBER_OF_REPLICAS, NUMBER_OF_SHARDS, REFRESH_INTERVAL};
pub use provider::{parse_search_response, OpenSearchProvider};
