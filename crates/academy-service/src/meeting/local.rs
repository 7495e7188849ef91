//! Room naming without a remote provider.

use async_trait::async_trait;

use academy_core::result::AppResult;
use academy_entity::session::Session;

use super::provider::MeetingProvider;

/// Derives deterministic room names when no meeting server is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalRoomProvider;

impl LocalRoomProvider {
    /// Room name for `session`.
    pub fn room_name(session: &Session) -> String {
        format!("{}-{}", session.kind, session.id.as_uuid().simple())
    }
}

#[async_trait]
impl MeetingProvider for LocalRoomProvider {
    async fn prepare_room(&self, session: &Session) -> AppResult<String> {
        Ok(Self::room_name(session))
    }
}
