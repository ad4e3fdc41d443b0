use crate::database::key_value::KeyValueStore;
use crate::database::memory_store::MemoryStore;
use crate::error::app_error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Typed access to the JSON documents kept in the key-value store.
///
/// Collections are stored whole: a read parses the full array and a write
/// serializes it back. Every read-modify-write goes through `update_collection`,
/// which holds `write_lock` for its duration, so concurrent requests in this
/// process cannot overwrite each other's changes. Other processes writing to
/// the same backend are not covered by the lock.
#[derive(Clone)]
pub struct StoreRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl StoreRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    #[cfg(test)]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub(crate) async fn read_document<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.store.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(|e| AppError::serialization(format!("Malformed JSON under key {}", key), e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub(crate) async fn write_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        debug!(key = %key, bytes = raw.len(), "writing document");
        self.store.set(key, raw).await
    }

    /// An absent key reads as an empty collection.
    pub(crate) async fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        Ok(self.read_document::<Vec<T>>(key).await?.unwrap_or_default())
    }

    /// Read the whole collection, apply `mutate`, write it back, all under the write lock.
    /// Nothing is written when `mutate` fails.
    pub(crate) async fn update_collection<T, R, F>(&self, key: &str, mutate: F) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_collection::<T>(key).await?;
        let result = mutate(&mut items)?;
        self.write_document(key, &items).await?;
        Ok(result)
    }

    /// Write a single document only if the key is still empty.
    pub(crate) async fn insert_document_if_absent<T: Serialize + DeserializeOwned>(&self, key: &str, value: &T) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        if self.store.get(key).await?.is_some() {
            return Ok(false);
        }
        self.write_document(key, value).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::key_value::SESSIONS_KEY;

    #[tokio::test]
    async fn missing_collection_reads_empty() {
        let repo = StoreRepository::in_memory();
        let items: Vec<u32> = repo.read_collection(SESSIONS_KEY).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_a_storage_error() {
        let repo = StoreRepository::in_memory();
        repo.store().set(SESSIONS_KEY, "{oops".to_string()).await.unwrap();

        let result = repo.read_collection::<u32>(SESSIONS_KEY).await;
        assert!(matches!(result, Err(AppError::Serialization { .. })));
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() {
        let repo = StoreRepository::in_memory();
        repo.write_document(SESSIONS_KEY, &vec![1u32]).await.unwrap();

        let result: Result<(), AppError> = repo
            .update_collection::<u32, _, _>(SESSIONS_KEY, |items| {
                items.push(2);
                Err(AppError::BadRequest("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        let items: Vec<u32> = repo.read_collection(SESSIONS_KEY).await.unwrap();
        assert_eq!(items, vec![1]);
    }

    /// Two writers doing an unguarded read / modify / write of the same key:
    /// the later write discards the earlier one.
    #[tokio::test]
    async fn unguarded_read_modify_write_loses_an_update() {
        let repo = StoreRepository::in_memory();
        repo.write_document(SESSIONS_KEY, &0u32).await.unwrap();

        let first: u32 = repo.read_document(SESSIONS_KEY).await.unwrap().unwrap();
        let second: u32 = repo.read_document(SESSIONS_KEY).await.unwrap().unwrap();
        repo.write_document(SESSIONS_KEY, &(first + 1)).await.unwrap();
        repo.write_document(SESSIONS_KEY, &(second + 1)).await.unwrap();

        let counter: u32 = repo.read_document(SESSIONS_KEY).await.unwrap().unwrap();
        assert_eq!(counter, 1);
    }

    #[tokio::test]
    async fn concurrent_guarded_updates_are_all_kept() {
        let repo = StoreRepository::in_memory();

        let mut handles = Vec::new();
        for n in 0..16u32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.update_collection::<u32, _, _>(SESSIONS_KEY, |items| {
                    items.push(n);
                    Ok(())
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let items: Vec<u32> = repo.read_collection(SESSIONS_KEY).await.unwrap();
        assert_eq!(items.len(), 16);
    }
}
