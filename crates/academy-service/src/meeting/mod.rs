//! Meeting rooms and recordings.

pub mod http;
pub mod local;
pub mod provider;

pub use http::HttpMeetingClient;
pub use local::LocalRoomProvider;
pub use provider::{MeetingProvider, RecordingCapable, RecordingRegistry};
