//! PostgreSQL advisory lock for sweeps.
//!
//! The lock is session-scoped, so it lives on a connection detached from
//! the pool. Dropping the lease closes that connection, which releases the
//! lock even if the process never gets to run an explicit unlock.

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, PgPool};
use tracing::debug;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_core::traits::{SweepLease, SweepLock};

/// `pg_try_advisory_lock(hashtext(name))` on a dedicated connection.
#[derive(Debug, Clone)]
pub struct PgAdvisoryLock {
    pool: PgPool,
}

impl PgAdvisoryLock {
    /// Create a lock backed by `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Owns the locking connection until the lease is dropped.
struct AdvisoryGuard {
    conn: Option<PgConnection>,
}

impl Drop for AdvisoryGuard {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = conn.close().await;
                });
            }
        }
    }
}

#[async_trait]
impl SweepLock for PgAdvisoryLock {
    async fn try_acquire(&self, name: &str) -> AppResult<Option<SweepLease>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire lock connection", e)
            })?
            .detach();

        let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock(hashtext($1))")
            .bind(name)
            .fetch_one(&mut conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to take advisory lock", e)
            })?;

        if !acquired {
            debug!(lock = name, "Advisory lock held elsewhere");
            let _ = conn.close().await;
            return Ok(None);
        }

        debug!(lock = name, "Advisory lock acquired");
        Ok(Some(SweepLease::new(
            name,
            AdvisoryGuard { conn: Some(conn) },
        )))
    }
}
