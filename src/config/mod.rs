use std::{env, str::FromStr, time::Duration};

use crate::{
    error::{AppError, Result},
    ledger::Address,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub chain: ChainConfig,
    pub materializer: MaterializerConfig,
    pub timelapse: TimelapseConfig,
    pub ws: WsConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    pub pool_size: usize,
    pub connect_timeout: Duration,
    pub local_canvas_max_capacity: u64,
    pub local_canvas_short_ttl: u64,
    pub local_canvas_mid_ttl: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::InvalidParams(format!(
                "Unknown ledger store '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub store: StoreBackend,
    pub block_interval: Duration,
    pub max_transactions_per_block: usize,
    pub mempool_capacity: usize,
    pub admin_address: Address,
    pub wallet_address: Address,
    pub genesis_balances: Vec<(Address, u64)>,
}

#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    pub event_buffer_size: usize,
    pub block_fetch_attempts: u32,
    pub block_fetch_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct TimelapseConfig {
    pub chunk_target: u64,
    pub preview_scale: u32,
}

#[derive(Debug, Clone)]
pub struct WsConfig {
    pub max_connections_per_room: usize,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub submit_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env_or_default("HOST", "127.0.0.1"),
                port: env_or_parse("PORT", 8080)?,
                cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS", vec!["".into()]),
                max_concurrent_requests: env_or_parse("SERVER_MAX_CONCURRENT_REQUESTS", 100)?,
            },
            database: DatabaseConfig {
                url: env_required("DATABASE_URL")?,
                max_connections: env_or_parse("DB_MAX_CONNECTIONS", 10)?,
                min_connections: env_or_parse("DB_MIN_CONNECTIONS", 5)?,
                connect_timeout: Duration::from_secs(env_or_parse("DB_CONNECT_TIMEOUT_SECS", 10)?),
                idle_timeout: Duration::from_secs(env_or_parse("DB_IDLE_TIMEOUT_SECS", 300)?),
            },
            cache: CacheConfig {
                url: env_required("CACHE_URL")?,
                pool_size: env_or_parse("CACHE_POOL_SIZE", 10)?,
                connect_timeout: Duration::from_secs(env_or_parse(
                    "CACHE_CONNECT_TIMEOUT_SECS",
                    10,
                )?),
                local_canvas_max_capacity: env_or_parse("CACHE_LOCAL_CANVAS_MAX_CAPACITY", 500)?,
                local_canvas_short_ttl: env_or_parse("CACHE_LOCAL_CANVAS_SHORT_TTL", 15)?,
                local_canvas_mid_ttl: env_or_parse("CACHE_LOCAL_CANVAS_MID_TTL", 30)?,
            },
            chain: ChainConfig {
                store: env_or_parse("LEDGER_STORE", StoreBackend::Memory)?,
                block_interval: Duration::from_millis(env_or_parse(
                    "CHAIN_BLOCK_INTERVAL_MS",
                    10_000,
                )?),
                max_transactions_per_block: env_or_parse("CHAIN_MAX_TRANSACTIONS_PER_BLOCK", 256)?,
                mempool_capacity: env_or_parse("CHAIN_MEMPOOL_CAPACITY", 4096)?,
                admin_address: env_required("CHAIN_ADMIN_ADDRESS")?.parse()?,
                wallet_address: env_required("CHAIN_WALLET_ADDRESS")?.parse()?,
                genesis_balances: parse_balances(&env_or_default("CHAIN_GENESIS_BALANCES", ""))?,
            },
            materializer: MaterializerConfig {
                event_buffer_size: env_or_parse("MATERIALIZER_EVENT_BUFFER", 1024)?,
                block_fetch_attempts: env_or_parse("MATERIALIZER_FETCH_ATTEMPTS", 3)?,
                block_fetch_delay: Duration::from_millis(env_or_parse(
                    "MATERIALIZER_FETCH_DELAY_MS",
                    500,
                )?),
            },
            timelapse: TimelapseConfig {
                chunk_target: env_or_parse("TIMELAPSE_CHUNK_TARGET", 30)?,
                preview_scale: env_or_parse("TIMELAPSE_PREVIEW_SCALE", 1)?,
            },
            ws: WsConfig {
                max_connections_per_room: env_or_parse("WS_MAX_CONNECTIONS_PER_ROOM", 100)?,
            },
            rate_limit: RateLimitConfig {
                submit_limit: env_or_parse("RATE_LIMIT_SUBMIT", 30)?,
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain.block_interval.is_zero() {
            return Err(AppError::InvalidParams(
                "CHAIN_BLOCK_INTERVAL_MS must be positive".into(),
            ));
        }

        if self.chain.max_transactions_per_block == 0 || self.chain.mempool_capacity == 0 {
            return Err(AppError::InvalidParams(
                "Block and mempool capacity must be positive".into(),
            ));
        }

        if self.materializer.event_buffer_size == 0 {
            return Err(AppError::InvalidParams(
                "MATERIALIZER_EVENT_BUFFER must be positive".into(),
            ));
        }

        if self.materializer.block_fetch_attempts == 0 {
            return Err(AppError::InvalidParams(
                "MATERIALIZER_FETCH_ATTEMPTS must be at least 1".into(),
            ));
        }

        if self.timelapse.chunk_target == 0 || self.timelapse.preview_scale == 0 {
            return Err(AppError::InvalidParams(
                "Timelapse chunk target and preview scale must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Parses `address:amount` pairs separated by commas.
pub fn parse_balances(value: &str) -> Result<Vec<(Address, u64)>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (address, amount) = entry.split_once(':').ok_or_else(|| {
                AppError::InvalidParams(format!("Invalid genesis balance '{entry}'"))
            })?;
            let amount = amount
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidParams(format!("Invalid amount in '{entry}'")))?;
            Ok((address.trim().parse()?, amount))
        })
        .collect()
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| AppError::InvalidParams(format!("Invalid value for {key}"))),
        Err(_) => Ok(default),
    }
}

fn env_required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::InvalidParams(format!("{key} is required")))
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    env::var(key)
        .map(|val| {
            val.split(',')
                .map(|str_val| str_val.trim().to_string())
                .collect()
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_genesis_balances() {
        let balances = parse_balances(
            "0101010101010101010101010101010101010101:500, 0x0202020202020202020202020202020202020202:7",
        )
        .unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0], (Address::new([1; 20]), 500));
        assert_eq!(balances[1], (Address::new([2; 20]), 7));
    }

    #[test]
    fn empty_balances_are_allowed() {
        assert!(parse_balances("").unwrap().is_empty());
    }

    #[test]
    fn rejects_balance_without_amount() {
        assert!(parse_balances("0101010101010101010101010101010101010101").is_err());
    }

    #[test]
    fn parses_store_backend() {
        assert_eq!("Redis".parse::<StoreBackend>().unwrap(), StoreBackend::Redis);
        assert!("disk".parse::<StoreBackend>().is_err());
    }
}
