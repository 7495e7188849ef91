//! Scheduler connection pool.
//!
//! Sweep locks pin one pooled connection each for the length of a batch, so
//! connections are checked on acquire and tagged with an application name
//! that makes them easy to find in `pg_stat_activity`.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use academy_core::config::DatabaseConfig;
use academy_core::error::{AppError, ErrorKind};

/// `application_name` reported by every scheduler connection.
pub const APPLICATION_NAME: &str = "academy-scheduler";

/// Pool shared by repositories, sweep locks and migrations.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = connect_options(config)?;
        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("<default>"),
            max_connections = config.max_connections,
            "Opening scheduler database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Scheduler database unreachable at {}", mask_password(&config.url)),
                    e,
                )
            })?;

        debug!(size = pool.size(), "Scheduler database pool open");
        Ok(Self { pool })
    }

    /// The sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Repositories over this pool.
    pub fn repositories(&self) -> crate::repositories::Repositories {
        crate::repositories::Repositories::new(self.pool.clone())
    }

    /// Apply the scheduler's embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        crate::migration::run_migrations(&self.pool).await
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Scheduler database health check failed", e)
            })?;
        Ok(one == 1)
    }

    /// Close the pool, releasing any sweep locks still held by its connections.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Scheduler database pool closed");
    }
}

/// Parse the configured URL and tag it with [`APPLICATION_NAME`].
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, AppError> {
    let options: PgConnectOptions = config.url.parse().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("database.url is not a PostgreSQL URL: {}", mask_password(&config.url)),
            e,
        )
    })?;
    Ok(options.application_name(APPLICATION_NAME))
}

/// Replace the password in a connection URL with `****`.
pub fn mask_password(url: &str) -> String {
    let authority_start = url.find("://").map_or(0, |p| p + 3);
    let Some(at) = url.rfind('@').filter(|&at| at >= authority_start) else {
        return url.to_string();
    };
    let userinfo = &url[authority_start..at];
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}{}:****{}", &url[..authority_start], user, &url[at..]),
        None => url.to_string(),
    }
}
