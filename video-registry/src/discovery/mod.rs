//! Discovery loop for the video registry.
//!
//! Polls the catalog for videos published within the lookback window, fetches
//! their details and writes them to the store, one cycle at a time.

mod outcome;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use video_registry_repository::VideoStoreProvider;
use video_registry_shared::VideoDocument;

use crate::catalog::{
    DetailEntry, DetailsPage, DiscoveryQuery, VideoCatalog, MAX_RESULTS_PER_CALL,
};
use crate::errors::IngestError;
use crate::rotation::KeyRotation;

pub use outcome::{CycleOutcome, CycleStats};

/// Default catalog query.
pub const DEFAULT_VIDEO_QUERY: &str = "football";

/// Default pause between cycles in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default lookback window in minutes.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 30;

/// Format of the `publishedAfter` watermark.
pub const WATERMARK_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Configuration for the discovery loop.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Free-text catalog query.
    pub query: String,
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
    /// How far back from "now" a video counts as newly published.
    pub lookback: TimeDelta,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_VIDEO_QUERY.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            lookback: TimeDelta::minutes(DEFAULT_LOOKBACK_MINUTES),
        }
    }
}

/// Lower bound on publication time for a cycle starting at `now`.
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use video_registry::discovery::published_after;
///
/// let now = Utc.with_ymd_and_hms(2021, 6, 15, 10, 0, 0).unwrap();
/// assert_eq!(published_after(now, TimeDelta::minutes(30)), "2021-06-15T09:30:00Z");
/// ```
pub fn published_after(now: DateTime<Utc>, lookback: TimeDelta) -> String {
    (now - lookback).format(WATERMARK_FORMAT).to_string()
}

/// The long-running poller and the only writer to the store.
///
/// Owns the key rotation state, so the known-good key survives from one
/// cycle to the next.
pub struct DiscoveryLoop {
    catalog: Arc<dyn VideoCatalog>,
    store: Arc<dyn VideoStoreProvider>,
    rotation: KeyRotation,
    config: DiscoveryConfig,
}

impl DiscoveryLoop {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        store: Arc<dyn VideoStoreProvider>,
        rotation: KeyRotation,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            rotation,
            config,
        }
    }

    pub fn rotation(&self) -> &KeyRotation {
        &self.rotation
    }

    /// Run cycles until a shutdown signal arrives.
    ///
    /// The signal is only observed during the pause between cycles, so a
    /// cycle in progress always runs to completion.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            query = %self.config.query,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            lookback_minutes = self.config.lookback.num_minutes(),
            "Starting discovery loop"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = shutdown.recv() => {
                    info!("Discovery loop received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Run one cycle with the current wall-clock time.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if it started at `now`.
    ///
    /// Catalog failures end the cycle and are reported as
    /// [`CycleOutcome::Aborted`]; they never escape.
    #[instrument(skip(self))]
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let watermark = published_after(now, self.config.lookback);
        debug!(published_after = %watermark, "Checking for new video uploads");

        let mut stats = CycleStats::default();
        let outcome = match self.discover(&watermark, &mut stats).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, published_after = %watermark, "Error while fetching newly published videos");
                CycleOutcome::Aborted(stats)
            }
        };

        info!(
            outcome = outcome.label(),
            pages = stats.pages,
            persisted = stats.persisted,
            failed = stats.failed,
            "Discovery cycle finished"
        );
        outcome
    }

    async fn discover(
        &mut self,
        watermark: &str,
        stats: &mut CycleStats,
    ) -> Result<CycleOutcome, IngestError> {
        let mut query = DiscoveryQuery::new(self.config.query.clone(), watermark);

        loop {
            let catalog = Arc::clone(&self.catalog);
            let page_query = query.clone();
            let page = self
                .rotation
                .with_rotation(move |key| {
                    let catalog = Arc::clone(&catalog);
                    let query = page_query.clone();
                    async move { catalog.search_videos(&query, &key).await }
                })
                .await?;

            // No working key: rotation already asked for a new one
            let Some(page) = page else {
                return Ok(CycleOutcome::CredentialsExhausted(*stats));
            };
            stats.pages += 1;

            let ids = page.video_ids();
            if ids.is_empty() {
                info!(published_after = %watermark, "No new videos published");
                return Ok(CycleOutcome::CaughtUp(*stats));
            }

            for chunk in ids.chunks(MAX_RESULTS_PER_CALL) {
                let Some(details) = self.fetch_details(chunk).await? else {
                    return Ok(CycleOutcome::CredentialsExhausted(*stats));
                };
                self.persist(details, stats).await;
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => query = query.with_page_token(Some(token)),
                None => return Ok(CycleOutcome::Completed(*stats)),
            }
        }
    }

    async fn fetch_details(&mut self, ids: &[String]) -> Result<Option<DetailsPage>, IngestError> {
        let catalog = Arc::clone(&self.catalog);
        let ids = ids.to_vec();
        let details = self
            .rotation
            .with_rotation(move |key| {
                let catalog = Arc::clone(&catalog);
                let ids = ids.clone();
                async move { catalog.video_details(&ids, &key).await }
            })
            .await?;
        Ok(details)
    }

    /// Write every detail as its own document.
    ///
    /// Malformed entries and failed writes are counted and skipped.
    async fn persist(&self, details: DetailsPage, stats: &mut CycleStats) {
        for entry in details.items {
            let detail = match entry {
                DetailEntry::Video(detail) => detail,
                malformed @ DetailEntry::Malformed(_) => {
                    stats.failed += 1;
                    warn!(
                        video_id = malformed.id().unwrap_or("unknown"),
                        "Video details are missing required fields, skipping"
                    );
                    continue;
                }
            };
            let document = VideoDocument::from(detail);
            match self.store.add_document(&document).await {
                Ok(outcome) => {
                    stats.persisted += 1;
                    debug!(
                        video_id = %document.id,
                        partition = %outcome.partition,
                        result = ?outcome.result,
                        "Stored video"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    let e = IngestError::from(e);
                    warn!(video_id = %document.id, error = %e, "Failed to store video, skipping");
                }
            }
        }
    }
}
