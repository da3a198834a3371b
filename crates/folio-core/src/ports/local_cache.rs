use async_trait::async_trait;

/// Client-resident key/value storage that survives the authoring session
/// (browser storage on the web, a file for native clients).
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Result<Option<String>, LocalCacheError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), LocalCacheError>;

    /// Delete a key from the cache.
    async fn remove(&self, key: &str) -> Result<(), LocalCacheError>;
}

/// Local cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum LocalCacheError {
    #[error("Storage unavailable: {0}")]
    Io(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LocalCacheError {
    fn from(err: serde_json::Error) -> Self {
        LocalCacheError::Serialization(err.to_string())
    }
}
