use crate::common::types::SessionKey;
use crate::player::queue::TrackQueue;
use crate::track::{QueueEntry, TrackLocator};
use crate::voice::VoiceConnection;

/// Lifecycle of one playback session. `is_looping` and
/// `is_fallback_playback` are orthogonal flags on the context, not
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Disconnected,
    /// Voice-connected with nothing queued or playing.
    Idle,
    Playing,
    Paused,
}

/// All state owned by one session's actor task. Only the actor mutates
/// this; everything external goes through the session's event stream.
pub struct PlayerContext {
    pub session_key: SessionKey,
    pub state: SessionState,
    pub voice: Option<VoiceConnection>,
    /// Non-null only while `Playing` or `Paused`.
    pub current: Option<QueueEntry>,
    pub is_looping: bool,
    /// True while the current track came from the resolution cache
    /// rather than the queue.
    pub is_fallback_playback: bool,
    pub queue: TrackQueue,
    /// Every track the session ever accepted, in enqueue order.
    pub played_history: Vec<TrackLocator>,
    /// Identifier of the current play instance. Completion signals carry
    /// the id they were issued for; stale ones are discarded.
    pub play_seq: u64,
    pub idle_task: Option<tokio::task::JoinHandle<()>>,
    /// Bumped on every idle-timer schedule/cancel so a fire that lost
    /// the race to a cancel identifies itself as stale.
    pub idle_epoch: u64,
}

impl PlayerContext {
    pub fn new(session_key: SessionKey) -> Self {
        Self {
            session_key,
            state: SessionState::Disconnected,
            voice: None,
            current: None,
            is_looping: false,
            is_fallback_playback: false,
            queue: TrackQueue::default(),
            played_history: Vec::new(),
            play_seq: 0,
            idle_task: None,
            idle_epoch: 0,
        }
    }

    /// Starts a new play instance and returns its id.
    pub fn next_play_id(&mut self) -> u64 {
        self.play_seq += 1;
        self.play_seq
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Playing | SessionState::Paused)
    }
}
