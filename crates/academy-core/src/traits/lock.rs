//! Mutual exclusion for sweeps.
//!
//! Two instances of the same sweep must never run against the same data
//! at once. Each sweep takes a lease keyed by its command name before it
//! evaluates anything and holds it until the batch finishes.

use async_trait::async_trait;

use crate::result::AppResult;

/// A held sweep lock. The lock is released when the lease is dropped.
pub struct SweepLease {
    name: String,
    _guard: Box<dyn Send>,
}

impl SweepLease {
    /// Wrap a backend-specific guard whose `Drop` releases the lock.
    pub fn new(name: impl Into<String>, guard: impl Send + 'static) -> Self {
        Self {
            name: name.into(),
            _guard: Box::new(guard),
        }
    }

    /// The lock key.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SweepLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepLease")
            .field("name", &self.name)
            .finish()
    }
}

/// Non-blocking lock keyed by sweep name.
#[async_trait]
pub trait SweepLock: Send + Sync + std::fmt::Debug + 'static {
    /// Try to take the lock. Returns `None` if another holder has it.
    async fn try_acquire(&self, name: &str) -> AppResult<Option<SweepLease>>;
}
