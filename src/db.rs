use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let duplicate = e
            .as_database_error()
            .and_then(|d| d.code())
            .is_some_and(|code| code == UNIQUE_VIOLATION);
        if duplicate {
            StoreError::Duplicate
        } else {
            StoreError::Backend(e.into())
        }
    }
}

/// Connect to Postgres, retrying with a linear back-off.
pub async fn connect_with_retry(url: &str, attempts: u32) -> anyhow::Result<PgPool> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match PgPoolOptions::new().max_connections(10).connect(url).await {
            Ok(pool) => {
                info!(attempt, "database connected");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                let delay = Duration::from_secs(u64::from(attempt));
                warn!(error = %e, attempt, ?delay, "database connect failed; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e).context("connect to database"),
        }
    }
}
