use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::CacheError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// Synthetic response for requests that cannot be served while offline.
    pub fn offline() -> Self {
        Self::new(503, Bytes::from_static(b"Offline"))
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Named caches of url → response.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Writes every entry or none of them.
    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> Result<(), CacheError>;

    async fn lookup(&self, cache_name: &str, key: &str)
        -> Result<Option<CachedResponse>, CacheError>;

    async fn cache_names(&self) -> Result<Vec<String>, CacheError>;

    /// Returns whether the cache existed.
    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError>;
}

#[derive(Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<HashMap<String, HashMap<String, CachedResponse>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self, cache_name: &str) -> usize {
        self.caches
            .read()
            .await
            .get(cache_name)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> Result<(), CacheError> {
        let mut caches = self.caches.write().await;
        caches
            .entry(cache_name.to_string())
            .or_default()
            .extend(entries);
        Ok(())
    }

    async fn lookup(
        &self,
        cache_name: &str,
        key: &str,
    ) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self
            .caches
            .read()
            .await
            .get(cache_name)
            .and_then(|cache| cache.get(key))
            .cloned())
    }

    async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        let mut names: Vec<String> = self.caches.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
        Ok(self.caches.write().await.remove(cache_name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_lookup_delete() {
        let storage = MemoryCacheStorage::new();
        storage
            .put_all(
                "noemafeed-v1",
                vec![("https://a.example/".into(), CachedResponse::ok("shell"))],
            )
            .await
            .unwrap();

        let hit = storage
            .lookup("noemafeed-v1", "https://a.example/")
            .await
            .unwrap();
        assert_eq!(hit.map(|r| r.body), Some(Bytes::from_static(b"shell")));
        assert!(storage
            .lookup("noemafeed-v2", "https://a.example/")
            .await
            .unwrap()
            .is_none());

        assert_eq!(storage.cache_names().await.unwrap(), vec!["noemafeed-v1"]);
        assert!(storage.delete("noemafeed-v1").await.unwrap());
        assert!(!storage.delete("noemafeed-v1").await.unwrap());
        assert_eq!(storage.entry_count("noemafeed-v1").await, 0);
    }

    #[test]
    fn offline_response_shape() {
        let resp = CachedResponse::offline();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, Bytes::from_static(b"Offline"));
        assert_eq!(resp.header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert!(!resp.is_success());
    }
}
