//! # Video Registry Shared
//!
//! This crate defines shared data structures used across the video registry:
//! the document persisted for every ingested video, the rows and pagination
//! envelope returned by the read API, and the query inputs accepted by it.

pub mod types;

pub use types::page::{Pagination, StoredVideo, VideosPage};
pub use types::query::{PageRequest, SearchText};
pub use types::video_document::VideoDocument;
