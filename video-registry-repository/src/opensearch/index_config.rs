//! OpenSearch partition settings and mappings.
//!
//! Every monthly partition is created with the same body, which also attaches
//! the partition to the read alias.

use serde_json::{json, Value};

/// Primary shards per partition.
pub const NUMBER_OF_SHARDS: u32 = 3;

/// Replicas per primary shard.
pub const NUMBER_OF_REPLICAS: u32 = 1;

/// How often new writes become visible to searches.
pub const REFRESH_INTERVAL: &str = "5s";

/// Get the creation body for a video partition.
///
/// The configuration includes:
/// - **keyword** ids and kind for exact lookups
/// - **text** title, description and channel title for full-text search
/// - **date** `published_at` (ISO-8601) and `created_at` (epoch milliseconds)
/// - The thumbnail URL, stored but not indexed
///
/// # Arguments
///
/// * `alias` - The read alias the new partition joins
pub fn get_index_settings(alias: &str) -> Value {
    json!({
        "settings": {
            "number_of_shards": NUMBER_OF_SHARDS,
            "number_of_replicas": NUMBER_OF_REPLICAS,
            "refresh_interval": REFRESH_INTERVAL
        },
        "mappings": {
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "kind": {
                    "type": "keyword"
                },
                "published_at": {
                    "type": "date"
                },
                "created_at": {
                    "type": "date",
                    "format": "epoch_millis"
                },
                "title": {
                    "type": "text"
                },
                "description": {
                    "type": "text"
                },
                "thumbnail_url": {
                    "type": "keyword",
                    "index": false
                },
                "channel_title": {
                    "type": "text"
                }
            }
        },
        "aliases": {
            alias: {}
        }
    })
}
