pub mod local;
pub mod redis;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::cache::local::LocalCache;
use crate::infrastructure::cache::redis::RedisCache;

pub struct Cache {
    pub local: Arc<LocalCache>,
    pub redis: RedisCache,
}

impl Cache {
    pub async fn init(config: &Config) -> Result<Self> {
        Ok(Self {
            local: Arc::new(LocalCache::new(&config.cache)),
            redis: RedisCache::connect(&config.cache).await?,
        })
    }
}
