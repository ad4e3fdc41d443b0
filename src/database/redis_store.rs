use crate::database::key_value::KeyValueStore;
use crate::error::app_error::AppError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url).map_err(|e| AppError::redis("Invalid Redis URL", e))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::redis("Failed to connect to Redis", e))?;
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut connection = self.connection.clone();
        let _: () = connection.set(key, value).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
