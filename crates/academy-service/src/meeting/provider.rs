//! Meeting provider and recording capability traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use academy_core::result::AppResult;
use academy_entity::session::{Recording, Session, SessionKind};

/// Creates meeting rooms for upcoming sessions.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    /// Create or reuse the room for `session` and return its name.
    async fn prepare_room(&self, session: &Session) -> AppResult<String>;
}

/// Session kinds whose recordings the scheduler can stop.
#[async_trait]
pub trait RecordingCapable: Send + Sync {
    /// Stop `recording`. `Ok(false)` means the provider had nothing running.
    async fn stop_recording(&self, session: &Session, recording: &Recording) -> AppResult<bool>;
}

/// Recording handlers keyed by session kind.
#[derive(Clone, Default)]
pub struct RecordingRegistry {
    handlers: HashMap<SessionKind, Arc<dyn RecordingCapable>>,
}

impl RecordingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: SessionKind, handler: Arc<dyn RecordingCapable>) {
        self.handlers.insert(kind, handler);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, kind: SessionKind, handler: Arc<dyn RecordingCapable>) -> Self {
        self.register(kind, handler);
        self
    }

    /// The handler for `kind`, if recordings of that kind can be stopped.
    pub fn get(&self, kind: SessionKind) -> Option<Arc<dyn RecordingCapable>> {
        self.handlers.get(&kind).cloned()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<SessionKind> {
        let mut kinds: Vec<SessionKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for RecordingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
