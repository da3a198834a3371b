//! In-memory local cache - for tests and single-process sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use folio_core::ports::{LocalCache, LocalCacheError};

/// Local cache using a simple HashMap with async RwLock.
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryLocalCache {
    store: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for InMemoryLocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalCacheError> {
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalCacheError> {
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalCacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }
}
