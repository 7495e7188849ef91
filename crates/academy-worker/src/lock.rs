//! In-process sweep lock and the exclusive-run helper.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_core::traits::{SweepLease, SweepLock};

/// Lock table shared by every clone, for tests and single-node use.
#[derive(Debug, Clone, Default)]
pub struct LocalSweepLock {
    held: Arc<Mutex<HashSet<String>>>,
}

impl LocalSweepLock {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is currently held.
    pub fn is_held(&self, name: &str) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(name))
            .unwrap_or(false)
    }
}

struct LocalGuard {
    held: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for LocalGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.name);
        }
    }
}

#[async_trait]
impl SweepLock for LocalSweepLock {
    async fn try_acquire(&self, name: &str) -> AppResult<Option<SweepLease>> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| AppError::internal("Sweep lock table poisoned"))?;
        if !held.insert(name.to_string()) {
            return Ok(None);
        }
        drop(held);

        Ok(Some(SweepLease::new(
            name,
            LocalGuard {
                held: Arc::clone(&self.held),
                name: name.to_string(),
            },
        )))
    }
}

/// Run `task` while holding `name`. Returns `None` without running it when
/// the lock is busy.
pub async fn run_exclusive<T, F>(lock: &dyn SweepLock, name: &str, task: F) -> AppResult<Option<T>>
where
    F: Future<Output = AppResult<T>>,
{
    let Some(_lease) = lock.try_acquire(name).await? else {
        info!(lock = name, "Already running elsewhere, skipped");
        return Ok(None);
    };
    task.await.map(Some)
}
