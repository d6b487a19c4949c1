//! Error types for the video registry repository.
//!
//! This module provides a unified error type for all store operations.

mod video_store_error;

pub use video_store_error::VideoStoreError;
