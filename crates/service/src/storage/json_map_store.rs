use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::StoreError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file; every mutation rewrites the file
/// before returning, so a value visible in memory is already on disk.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if
    /// missing; an unreadable file is treated as empty.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                let path = file_path.display();
                warn!(path = %path, error = %e, "corrupt store file; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), StoreError> {
        let data = serde_json::to_vec(map)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or overwrite a value and persist.
    ///
    /// The write lock is held across the file write so readers never observe
    /// a value that is not yet durable.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        next.insert(key, value);
        self.save(&next).await?;
        *map = next;
        Ok(())
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(key) {
            return Ok(false);
        }
        let mut next = map.clone();
        next.remove(key);
        self.save(&next).await?;
        *map = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let name = format!("json_map_store_{}.json", uuid::Uuid::new_v4());
        let tmp = std::env::temp_dir().join(name);
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        store.insert("a".into(), "10".into()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("10"));

        // remove and reload persistence
        assert!(store.remove(&"b".into()).await?);
        assert!(!store.remove(&"b".into()).await?);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        let entries = reloaded.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("10"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() -> Result<(), anyhow::Error> {
        let name = format!("json_map_store_{}.json", uuid::Uuid::new_v4());
        let tmp = std::env::temp_dir().join(name);
        tokio::fs::write(&tmp, b"{not json").await?;
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert!(store.list().await.is_empty());
        store.insert("k".into(), "v".into()).await?;
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"k".into()).await.as_deref(), Some("v"));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
