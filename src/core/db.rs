use std::time::Duration;

use r2d2::Pool as r2d2Pool;
use redis::Client;
use sqlx::{pool::PoolOptions, Pool, Postgres};

use crate::settings::Config;

const REDIS_CONNECTION_TIMEOUT: Duration = Duration::from_millis(500);

pub async fn init_pool(config: &Config) -> anyhow::Result<Pool<Postgres>> {
    let pool = PoolOptions::new()
        .min_connections(5)
        .max_connections(100)
        .idle_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Redis pool of the rate limiter. Connections are opened lazily and a
/// checkout gives up after a short timeout, so an unreachable redis only
/// delays a request briefly.
pub fn init_redis_pool(config: &Config) -> anyhow::Result<r2d2Pool<Client>> {
    let client = Client::open(config.redis_url.clone())?;
    let pool = r2d2::Pool::builder()
        .connection_timeout(REDIS_CONNECTION_TIMEOUT)
        .min_idle(Some(0))
        .build_unchecked(client);
    Ok(pool)
}
