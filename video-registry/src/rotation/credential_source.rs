//! Where the API key pool comes from.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

/// Default location of the keys file.
pub const DEFAULT_KEYS_FILE: &str = "/var/keys.txt";

/// Supplies the ordered pool of API keys.
///
/// The pool is loaded again every time rotation has to fall back to it, so
/// a source may change between calls.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Load the pool in order. A source that cannot be read yields an empty pool.
    async fn load(&self) -> Vec<String>;

    /// Where the keys come from, for log lines that ask for a new key.
    fn describe(&self) -> String;
}

/// Keys read from a text file, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone)]
pub struct KeysFile {
    path: PathBuf,
}

impl KeysFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse the contents of a keys file.
pub fn parse_keys(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl CredentialSource for KeysFile {
    async fn load(&self) -> Vec<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => parse_keys(&contents),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read API keys file");
                Vec::new()
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed pool, e.g. from a comma-separated environment variable.
#[derive(Debug, Clone, Default)]
pub struct StaticKeys {
    keys: Vec<String>,
}

impl StaticKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Split a comma-separated list, dropping empty entries.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(
            csv.split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[async_trait]
impl CredentialSource for StaticKeys {
    async fn load(&self) -> Vec<String> {
        self.keys.clone()
    }

    fn describe(&self) -> String {
        "YOUTUBE_API_KEYS".to_string()
    }
}
