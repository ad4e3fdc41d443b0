use crate::config::{StorageBackend, StorageConfig};
use crate::database::key_value::KeyValueStore;
use crate::database::memory_store::MemoryStore;
use crate::database::postgres_store::PostgresStore;
use crate::database::redis_store::RedisStore;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use rocket::fairing::AdHoc;
use std::sync::Arc;

async fn init_store(storage_config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    let store: Arc<dyn KeyValueStore> = match storage_config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Redis => Arc::new(RedisStore::connect(&storage_config.redis_url).await?),
        StorageBackend::Postgres => Arc::new(PostgresStore::connect(storage_config).await?),
    };
    Ok(store)
}

pub fn stage_store(storage_config: StorageConfig) -> AdHoc {
    AdHoc::try_on_ignite("Key-value store", |rocket| async move {
        match init_store(&storage_config).await {
            Ok(store) => {
                tracing::info!(backend = store.backend_name(), "Storage initialized successfully");
                Ok(rocket.manage(StoreRepository::new(store)))
            }
            Err(e) => {
                tracing::error!(error = ?e, backend = ?storage_config.backend, "Failed to initialize storage");
                Err(rocket)
            }
        }
    })
}
