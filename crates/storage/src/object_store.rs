//! Partition sources backed by `object_store`.
//!
//! All data files (`index.json`, `stations.json`, per-day partitions) are
//! resolved relative to a single base location, which may be a local
//! directory or an HTTP(S) URL.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{http::HttpBuilder, local::LocalFileSystem, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use currents_common::{CurrentsError, CurrentsResult};

/// Fetches named resources relative to the data base location.
#[async_trait]
pub trait PartitionSource: Send + Sync {
    /// Fetch the raw bytes of a resource such as `index.json` or `2024-03-01.json`.
    async fn fetch(&self, name: &str) -> CurrentsResult<Bytes>;

    /// Human-readable base location, for logs.
    fn describe(&self) -> String;
}

/// Where the data files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local directory or `http(s)://` URL of the partitioned data.
    pub base: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base: "data/currents/partitioned".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }
}

/// Partition source over any `ObjectStore`.
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    prefix: Option<Path>,
    description: String,
}

impl ObjectStoreSource {
    /// Build a source from config: HTTP store for URLs, local filesystem otherwise.
    pub fn new(config: &SourceConfig) -> CurrentsResult<Self> {
        if config.is_remote() {
            let store = HttpBuilder::new()
                .with_url(config.base.trim_end_matches('/'))
                .build()
                .map_err(|e| {
                    CurrentsError::Config(format!("Failed to create HTTP client: {}", e))
                })?;
            Ok(Self {
                store: Arc::new(store),
                prefix: None,
                description: config.base.clone(),
            })
        } else {
            let store = LocalFileSystem::new_with_prefix(&config.base).map_err(|e| {
                CurrentsError::Config(format!("Invalid data directory {}: {}", config.base, e))
            })?;
            Ok(Self {
                store: Arc::new(store),
                prefix: None,
                description: config.base.clone(),
            })
        }
    }

    /// Wrap an existing store, resolving names under `prefix`.
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: Option<&str>) -> Self {
        let prefix = prefix.filter(|p| !p.is_empty()).map(Path::from);
        let description = match &prefix {
            Some(p) => format!("store:/{}", p),
            None => "store:/".to_string(),
        };
        Self {
            store,
            prefix,
            description,
        }
    }

    fn location(&self, name: &str) -> Path {
        match &self.prefix {
            Some(prefix) => prefix.child(name),
            None => Path::from(name),
        }
    }
}

#[async_trait]
impl PartitionSource for ObjectStoreSource {
    #[instrument(skip(self), fields(base = %self.description))]
    async fn fetch(&self, name: &str) -> CurrentsResult<Bytes> {
        let location = self.location(name);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| CurrentsError::data_load(name, format!("Cannot load resource: {}", e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| CurrentsError::data_load(name, format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Fetched resource");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[test]
    fn test_source_config_remote_detection() {
        assert!(SourceConfig::new("https://example.org/data").is_remote());
        assert!(!SourceConfig::new("/var/data").is_remote());
        assert!(!SourceConfig::default().is_remote());
    }

    #[tokio::test]
    async fn test_fetch_from_memory_store_with_prefix() {
        let store = Arc::new(InMemory::new());
        store
            .put(&Path::from("currents/index.json"), Bytes::from_static(b"{}").into())
            .await
            .unwrap();

        let source = ObjectStoreSource::from_store(store, Some("currents"));
        let bytes = source.fetch("index.json").await.unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn test_missing_resource_is_data_load_error() {
        let source = ObjectStoreSource::from_store(Arc::new(InMemory::new()), None);
        let err = source.fetch("2024-03-01.json").await.unwrap_err();
        match err {
            CurrentsError::DataLoad { resource, .. } => assert_eq!(resource, "2024-03-01.json"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
