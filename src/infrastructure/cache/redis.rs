use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{
    Config as PoolConfig, Connection, Pool, Runtime,
    redis::{self, AsyncCommands},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::CacheConfig,
    error::{AppError, Result},
    ledger::{
        StateReader, StateStore,
        store::Writes,
    },
};

const LEDGER_KEY_PREFIX: &str = "ledger";

#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub async fn connect(cache_config: &CacheConfig) -> Result<Self> {
        let cache = Self::from_config(cache_config)?;
        let mut redis_connection = cache.connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut *redis_connection)
            .await?;

        Ok(cache)
    }

    /// Builds the pool without opening a connection.
    pub fn from_config(cache_config: &CacheConfig) -> Result<Self> {
        let pool_config = PoolConfig::from_url(&cache_config.url);
        let pool = pool_config
            .builder()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .max_size(cache_config.pool_size)
            .wait_timeout(Some(cache_config.connect_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut redis_connection = self.connection().await?;

        let value: Option<String> = redis_connection.get(key).await?;
        match value {
            Some(val) => Ok(Some(serde_json::from_str(&val)?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut redis_connection = self.connection().await?;

        let serialized = serde_json::to_string(value)?;
        redis_connection
            .set_ex::<_, _, ()>(key, serialized, ttl.as_secs())
            .await?;
        Ok(())
    }

    /// Ledger state stored in the same Redis under a separate key prefix.
    pub fn ledger_store(&self) -> RedisStore {
        RedisStore {
            cache: self.clone(),
        }
    }
}

/// Ledger store over Redis. A batch is written inside one `MULTI`/`EXEC`.
#[derive(Clone)]
pub struct RedisStore {
    cache: RedisCache,
}

impl RedisStore {
    fn key(key: &str) -> String {
        format!("{LEDGER_KEY_PREFIX}:{key}")
    }
}

#[async_trait]
impl StateReader for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut redis_connection = self.cache.connection().await?;
        let value: Option<Vec<u8>> = redis_connection.get(Self::key(key)).await?;
        Ok(value)
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn write_batch(&self, writes: Writes) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in writes {
            pipe.set(Self::key(&key), value).ignore();
        }

        let mut redis_connection = self.cache.connection().await?;
        let _: () = pipe.query_async(&mut *redis_connection).await?;
        Ok(())
    }
}
