use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::utils::error::InventoryError;

pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Backstop expiry for cached availability views. Invalidation-on-sale
    /// keeps reads fresh; the TTL only bounds staleness after out-of-band
    /// writes (e.g. an admin reseed that skips the cache).
    pub cache_ttl: Duration,
    pub feed_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/boxoffice".to_string()),
            max_connections: env_parsed("DB_MAX_CONNECTIONS", 5),
            cache_ttl: Duration::from_secs(env_parsed("CACHE_TTL_SECS", 10)),
            feed_capacity: env_parsed("FEED_CAPACITY", crate::feed::FEED_CAPACITY),
        }
    }

    pub async fn connect(&self) -> Result<PgPool, InventoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;

        tracing::info!("Successfully connected to database");
        Ok(pool)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
