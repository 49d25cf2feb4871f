use async_trait::async_trait;
use serde::Serialize;

use crate::common::types::SessionKey;

/// User-visible side effects emitted by a session. The sink owns all
/// rendering and formatting; the orchestrator only states what happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notice {
    #[serde(rename_all = "camelCase")]
    TrackStarted {
        title: String,
        duration: String,
        /// True when this track was replayed from the resolution cache
        /// rather than drawn from the queue.
        from_cache: bool,
    },
    TrackPaused,
    TrackResumed,
    #[serde(rename_all = "camelCase")]
    QueueChanged { listing: String },
    #[serde(rename_all = "camelCase")]
    LoopToggled { looping: bool },
    #[serde(rename_all = "camelCase")]
    ResolutionFailed { title: String },
    #[serde(rename_all = "camelCase")]
    PlaybackFailed { title: String },
    VoiceConnectFailed,
    /// Nothing left to play; the session disconnects after the stated
    /// delay unless a new request arrives.
    #[serde(rename_all = "camelCase")]
    IdleWarning { timeout_secs: u64 },
    Disconnected,
    /// A pause/resume/skip arrived while no track was current.
    NothingPlaying,
}

/// Collaborator that renders session events to the user.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, session: &SessionKey, notice: Notice);
}
