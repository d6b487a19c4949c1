//! In-memory video store for testing and local development.
//!
//! `InMemoryVideoStore` keeps partitions as maps of document id to document
//! and follows the same partitioning and query rules as the OpenSearch
//! provider, so the discovery loop and the read API can run without a
//! cluster.
//!
//! # Example
//!
//! ```ignore
//! use video_registry_repository::{InMemoryVideoStore, VideoStoreProvider};
//!
//! let store = InMemoryVideoStore::new(PartitionScheme::default());
//! store.add_document(&document).await?;
//! let hits = store.list_all(&PageRequest::default()).await?;
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use video_registry_shared::{PageRequest, SearchText, StoredVideo, VideoDocument};

use crate::errors::VideoStoreError;
use crate::interfaces::{PartitionAdmin, VideoStoreProvider};
use crate::partition::{PartitionManager, PartitionScheme};
use crate::query::{search_terms, SortSpec, SEARCH_FIELDS};
use crate::types::{StoreHits, WriteOutcome, WriteResult};

type Partition = BTreeMap<String, VideoDocument>;

/// Video store that lives in process memory.
pub struct InMemoryVideoStore {
    /// Map of partition name -> document id -> document
    partitions: RwLock<BTreeMap<String, Partition>>,
    manager: PartitionManager,
}

impl Default for InMemoryVideoStore {
    fn default() -> Self {
        Self::new(PartitionScheme::default())
    }
}

impl InMemoryVideoStore {
    pub fn new(scheme: PartitionScheme) -> Self {
        Self {
            partitions: RwLock::new(BTreeMap::new()),
            manager: PartitionManager::new(scheme),
        }
    }

    /// Names of the partitions created so far, in name order.
    pub async fn partition_names(&self) -> Vec<String> {
        self.partitions.read().await.keys().cloned().collect()
    }

    /// Number of documents across every partition.
    pub async fn document_count(&self) -> usize {
        self.partitions.read().await.values().map(BTreeMap::len).sum()
    }

    /// Write a document as if the current time were `now`.
    pub async fn add_document_at(
        &self,
        document: &VideoDocument,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, VideoStoreError> {
        let partition = self.manager.resolve_write_partition_at(self, now).await?;
        let stamped = document.stamped(now);
        let document_id = stamped.document_id().to_string();

        let mut partitions = self.partitions.write().await;
        let docs = partitions
            .get_mut(&partition)
            .ok_or_else(|| VideoStoreError::index_not_found(partition.clone()))?;

        let result = match docs.insert(document_id.clone(), stamped) {
            Some(_) => WriteResult::Updated,
            None => WriteResult::Created,
        };

        debug!(partition = %partition, doc_id = %document_id, result = ?result, "Document written");
        Ok(WriteOutcome {
            partition,
            document_id,
            result,
        })
    }

    async fn query<F>(&self, page: &PageRequest, matches: F) -> Option<StoreHits>
    where
        F: Fn(&VideoDocument) -> bool,
    {
        let partitions = self.partitions.read().await;
        if partitions.is_empty() {
            return None;
        }

        let mut rows: Vec<StoredVideo> = partitions
            .iter()
            .flat_map(|(name, docs)| {
                docs.iter().map(move |(id, doc)| StoredVideo {
                    video_index: name.clone(),
                    video_id: id.clone(),
                    document: doc.clone(),
                })
            })
            .filter(|row| matches(&row.document))
            .collect();

        let sort = SortSpec::parse(page.sort_or_default());
        rows.sort_by(|a, b| {
            let ordering = compare_values(
                &field_value(&a.document, &sort.field),
                &field_value(&b.document, &sort.field),
            );
            let ordering = if sort.descending {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then_with(|| a.video_id.cmp(&b.video_id))
        });

        let total = rows.len() as u64;
        let rows = rows
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();

        Some(StoreHits { rows, total })
    }
}

fn field_value(document: &VideoDocument, field: &str) -> Value {
    serde_json::to_value(document)
        .ok()
        .and_then(|value| value.get(field).cloned())
        .unwrap_or(Value::Null)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// OR match of lowercased terms against the words of the searched fields.
fn matches_any(document: &VideoDocument, terms: &[String]) -> bool {
    let mut haystack = HashSet::new();
    for field in SEARCH_FIELDS {
        let text = match field {
            "title" => &document.title,
            _ => &document.description,
        };
        haystack.extend(words(text));
    }
    terms
        .iter()
        .flat_map(|term| words(term))
        .any(|term| haystack.contains(&term))
}

#[async_trait]
impl PartitionAdmin for InMemoryVideoStore {
    async fn partition_exists(&self, name: &str) -> Result<bool, VideoStoreError> {
        Ok(self.partitions.read().await.contains_key(name))
    }

    async fn create_partition(&self, name: &str) -> Result<(), VideoStoreError> {
        self.partitions
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }
}

#[async_trait]
impl VideoStoreProvider for InMemoryVideoStore {
    async fn add_document(&self, document: &VideoDocument) -> Result<WriteOutcome, VideoStoreError> {
        self.add_document_at(document, Utc::now()).await
    }

    async fn list_all(&self, page: &PageRequest) -> Result<Option<StoreHits>, VideoStoreError> {
        Ok(self.query(page, |_| true).await)
    }

    async fn search(
        &self,
        page: &PageRequest,
        text: &SearchText,
    ) -> Result<Option<StoreHits>, VideoStoreError> {
        let terms = search_terms(text);
        Ok(self.query(page, |doc| matches_any(doc, &terms)).await)
    }
}
