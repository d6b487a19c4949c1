//! Interface definitions for the video store.
//!
//! `VideoStoreProvider` is the read/write capability used by the discovery
//! loop and the read API. `PartitionAdmin` is the narrow set of index
//! operations the partition manager needs.

mod partition_admin;
mod video_store_provider;

pub use partition_admin::PartitionAdmin;
pub use video_store_provider::VideoStoreProvider;
