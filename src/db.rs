use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

use crate::store::{MemoryStore, MySqlStore, Store};

/// URL that selects the in-process store instead of MySQL.
pub const MEMORY_URL: &str = "memory://";

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

pub async fn init_store(database_url: &str) -> Result<Arc<dyn Store>> {
    if database_url == MEMORY_URL {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = init_db(database_url).await?;
    info!("Connected to MySQL");
    Ok(Arc::new(MySqlStore::new(pool)))
}
