//! This module defines the core data structures used across the video registry.
//! It re-exports the document, page and query types.

pub mod page;
pub mod query;
pub mod video_document;

pub use page::{Pagination, StoredVideo, VideosPage};
pub use query::{PageRequest, SearchText};
pub use video_document::VideoDocument;
