//! HTTP meeting server adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use academy_core::config::MeetingsConfig;
use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_entity::session::{Recording, Session};

use super::local::LocalRoomProvider;
use super::provider::{MeetingProvider, RecordingCapable};

#[derive(Debug, Serialize)]
struct CreateRoomRequest<'a> {
    name: &'a str,
    empty_timeout_seconds: u64,
    max_duration_minutes: i64,
    metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RoomResponse {
    name: String,
}

/// Talks to the meeting server's REST API.
#[derive(Debug, Clone)]
pub struct HttpMeetingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_duration_minutes: i64,
}

impl HttpMeetingClient {
    /// Build a client from `[meetings]` configuration.
    pub fn new(config: &MeetingsConfig, default_duration_minutes: i64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build meeting HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_duration_minutes,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl MeetingProvider for HttpMeetingClient {
    async fn prepare_room(&self, session: &Session) -> AppResult<String> {
        let name = LocalRoomProvider::room_name(session);
        let duration = session.effective_duration(self.default_duration_minutes);

        let response = self
            .client
            .post(self.url("/rooms"))
            .bearer_auth(&self.api_key)
            .json(&CreateRoomRequest {
                name: &name,
                empty_timeout_seconds: 300,
                max_duration_minutes: duration.num_minutes(),
                metadata: serde_json::json!({
                    "session_id": session.id,
                    "academy_id": session.academy_id,
                    "kind": session.kind,
                }),
            })
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Meeting, "Room request failed", e))?
            .error_for_status()
            .map_err(|e| AppError::with_source(ErrorKind::Meeting, "Room creation rejected", e))?;

        let room: RoomResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Meeting, "Malformed room response", e)
        })?;

        debug!(session_id = %session.id, room = %room.name, "Meeting room ready");
        Ok(room.name)
    }
}

#[async_trait]
impl RecordingCapable for HttpMeetingClient {
    async fn stop_recording(&self, session: &Session, recording: &Recording) -> AppResult<bool> {
        let Some(provider_ref) = recording.provider_ref.as_deref() else {
            return Ok(false);
        };

        let response = self
            .client
            .post(self.url(&format!("/recordings/{provider_ref}/stop")))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Meeting, "Stop recording request failed", e)
            })?;

        match response.status() {
            status if status.is_success() => {
                debug!(session_id = %session.id, recording_id = %recording.id, "Recording stopped");
                Ok(true)
            }
            StatusCode::NOT_FOUND | StatusCode::CONFLICT => Ok(false),
            status => Err(AppError::meeting(format!(
                "Meeting server returned {status} stopping recording {}",
                recording.id
            ))),
        }
    }
}
