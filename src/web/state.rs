use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::warn;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    config: Arc<AppConfig>,
}

impl AppState {
    /// The pool is built lazily: the public pages must keep serving from
    /// static content when the store is unreachable, so neither the first
    /// connection nor the migrations may take startup down.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(&config.database_url)
            .context("invalid DATABASE_URL")?;

        if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
            warn!(
                ?err,
                "failed to run database migrations; publications will fall back to the bibliography file"
            );
        }

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    pub fn pool_ref(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
