//! Dependency initialization and wiring for the video registry.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::time::sleep;
use tracing::{info, warn};
use video_registry_repository::{
    InMemoryVideoStore, OpenSearchProvider, PartitionScheme, VideoRegistryService,
    VideoStoreProvider, DEFAULT_ALIAS, DEFAULT_PARTITION_PREFIX,
};

use crate::catalog::{YoutubeCatalogClient, DEFAULT_BASE_URL};
use crate::discovery::{
    DiscoveryConfig, DiscoveryLoop, DEFAULT_LOOKBACK_MINUTES, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_VIDEO_QUERY,
};
use crate::rotation::{CredentialSource, KeyRotation, KeysFile, StaticKeys, DEFAULT_KEYS_FILE};
use crate::RegistryError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default catalog request timeout in seconds.
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 20;

/// Default HTTP bind address.
const DEFAULT_HTTP_BIND_ADDR: &str = "0.0.0.0:8000";

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection every retry interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse connection mode from environment variable.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive)
    /// Defaults to "retry" if not set or invalid.
    fn from_env() -> Self {
        Self::parse(&env::var("OPENSEARCH_CONNECTION_MODE").unwrap_or_else(|_| "retry".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Which store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// OpenSearch cluster at `OPENSEARCH_URL`.
    OpenSearch,
    /// Process memory; data is lost on restart.
    Memory,
}

impl StoreBackend {
    fn from_env() -> Self {
        Self::parse(&env::var("VIDEO_STORE").unwrap_or_else(|_| "opensearch".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "memory" | "in-memory" => Self::Memory,
            "opensearch" => Self::OpenSearch,
            _ => {
                warn!("Invalid VIDEO_STORE, defaulting to 'opensearch'");
                Self::OpenSearch
            }
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The discovery loop, ready to be spawned.
    pub discovery: DiscoveryLoop,
    /// The read service behind the HTTP API.
    pub service: VideoRegistryService,
    /// Where the HTTP API listens.
    pub bind_addr: SocketAddr,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VIDEO_STORE`: "opensearch" or "memory" (default: opensearch)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `INDEX_PREFIX`: Partition name prefix (default: "videos")
    /// - `INDEX_ALIAS`: Read alias name (default: "videos")
    /// - `YOUTUBE_BASE_URL`: Catalog base URL (default: https://www.googleapis.com)
    /// - `YOUTUBE_API_KEYS`: Comma-separated keys; overrides the keys file when set
    /// - `YOUTUBE_API_KEYS_FILE`: One key per line (default: /var/keys.txt)
    /// - `CATALOG_TIMEOUT_SECS`: Catalog request timeout (default: 20)
    /// - `VIDEO_QUERY`: Catalog query (default: football)
    /// - `POLL_INTERVAL_SECS`: Pause between cycles (default: 10)
    /// - `LOOKBACK_MINUTES`: Lookback window (default: 30)
    /// - `HTTP_BIND_ADDR`: HTTP listen address (default: 0.0.0.0:8000)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(RegistryError)` - If initialization fails (only in fail-fast mode for the store)
    pub async fn new() -> Result<Self, RegistryError> {
        let backend = StoreBackend::from_env();
        let scheme = PartitionScheme::new(
            env_or("INDEX_PREFIX", DEFAULT_PARTITION_PREFIX),
            env_or("INDEX_ALIAS", DEFAULT_ALIAS),
        );
        let base_url = env_or("YOUTUBE_BASE_URL", DEFAULT_BASE_URL);
        let catalog_timeout = env_parse("CATALOG_TIMEOUT_SECS", DEFAULT_CATALOG_TIMEOUT_SECS);
        let bind_addr = env_or("HTTP_BIND_ADDR", DEFAULT_HTTP_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| RegistryError::config(format!("Invalid HTTP_BIND_ADDR: {}", e)))?;

        let lookback_minutes = env_parse("LOOKBACK_MINUTES", DEFAULT_LOOKBACK_MINUTES);
        let discovery_config = DiscoveryConfig {
            query: env_or("VIDEO_QUERY", DEFAULT_VIDEO_QUERY),
            poll_interval: Duration::from_secs(env_parse(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )),
            lookback: TimeDelta::try_minutes(lookback_minutes).ok_or_else(|| {
                RegistryError::config(format!("LOOKBACK_MINUTES out of range: {}", lookback_minutes))
            })?,
        };

        info!(
            store = ?backend,
            prefix = %scheme.prefix,
            alias = %scheme.alias,
            catalog_url = %base_url,
            query = %discovery_config.query,
            bind_addr = %bind_addr,
            "Initializing dependencies"
        );

        let store: Arc<dyn VideoStoreProvider> = match backend {
            StoreBackend::Memory => {
                warn!("Using the in-memory store, videos are lost on restart");
                Arc::new(InMemoryVideoStore::new(scheme))
            }
            StoreBackend::OpenSearch => {
                let opensearch_url = env_or("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL);
                let connection_mode = ConnectionMode::from_env();
                let retry_interval =
                    env_parse("OPENSEARCH_RETRY_INTERVAL_SECS", DEFAULT_RETRY_INTERVAL_SECS);

                let provider = Self::connect_to_opensearch(
                    &opensearch_url,
                    scheme,
                    connection_mode,
                    Duration::from_secs(retry_interval),
                )
                .await?;

                info!(opensearch_url = %opensearch_url, "OpenSearch connection established");
                Arc::new(provider)
            }
        };

        let catalog = YoutubeCatalogClient::new(&base_url, Duration::from_secs(catalog_timeout))
            .map_err(|e| RegistryError::config(format!("Failed to create catalog client: {}", e)))?;

        let rotation = KeyRotation::new(Self::credential_source());
        info!(source = %rotation.source(), "API key source configured");

        let discovery = DiscoveryLoop::new(
            Arc::new(catalog),
            Arc::clone(&store),
            rotation,
            discovery_config,
        );
        let service = VideoRegistryService::new(store);

        Ok(Self {
            discovery,
            service,
            bind_addr,
        })
    }

    fn credential_source() -> Box<dyn CredentialSource> {
        match env::var("YOUTUBE_API_KEYS") {
            Ok(keys) if !keys.trim().is_empty() => Box::new(StaticKeys::from_csv(&keys)),
            _ => Box::new(KeysFile::new(env_or("YOUTUBE_API_KEYS_FILE", DEFAULT_KEYS_FILE))),
        }
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        scheme: PartitionScheme,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, RegistryError> {
        loop {
            match Self::try_connect_opensearch(url, scheme.clone()).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(RegistryError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch.
    async fn try_connect_opensearch(
        url: &str,
        scheme: PartitionScheme,
    ) -> Result<OpenSearchProvider, RegistryError> {
        let provider = OpenSearchProvider::new(url, scheme).await.map_err(|e| {
            RegistryError::config(format!("Failed to create OpenSearch provider: {}", e))
        })?;

        provider
            .ping()
            .await
            .map_err(|e| RegistryError::config(format!("OpenSearch did not answer: {}", e)))?;

        Ok(provider)
    }
}
