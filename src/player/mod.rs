use std::sync::Arc;
use std::time::Duration;

use tracing::{info, trace, warn};

use crate::cache::ResolutionCache;
use crate::common::types::{ChannelId, SessionKey};
use crate::notify::{NotificationSink, Notice};
use crate::resolver::StreamResolver;
use crate::track::TrackLocator;
use crate::voice::VoiceOutput;

pub mod context;
pub mod idle;
pub mod playback;
pub mod queue;

pub use context::{PlayerContext, SessionState};
pub use queue::TrackQueue;

/// Collaborators and knobs shared by every session actor.
pub struct PlayerDeps {
    pub voice: Arc<dyn VoiceOutput>,
    pub resolver: Arc<StreamResolver>,
    pub cache: Arc<ResolutionCache>,
    pub notifier: Arc<dyn NotificationSink>,
    pub idle_timeout: Duration,
}

/// Everything that can happen to a session. Events are drained by the
/// session's actor task one at a time, in acceptance order, which is the
/// only serialization point a session has.
pub enum SessionEvent {
    Enqueue {
        locator: TrackLocator,
        channel: ChannelId,
    },
    Pause,
    Resume,
    Skip,
    ToggleLoop,
    Stop,
    /// Posted by the completion signal of the play instance `play_id`.
    /// Stale ids (an earlier play instance, or arrival after `stop`) are
    /// discarded, so only the first completion of an instance triggers
    /// selection.
    TrackFinished { play_id: u64 },
    IdleTimeout { epoch: u64 },
    Snapshot { reply: flume::Sender<SessionSnapshot> },
}

/// Read-only view of a session for front-ends.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub current_title: Option<String>,
    pub is_looping: bool,
    pub is_fallback_playback: bool,
    pub queue_titles: Vec<String>,
    pub queue_listing: String,
}

/// Cheap, clonable front door to one session's event stream. Operations
/// are accepted in call order and processed serially by the actor.
#[derive(Clone)]
pub struct PlayerHandle {
    session_key: SessionKey,
    tx: flume::Sender<SessionEvent>,
}

impl PlayerHandle {
    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    pub fn enqueue(&self, locator: TrackLocator, channel: ChannelId) {
        self.send(SessionEvent::Enqueue { locator, channel });
    }

    pub fn pause(&self) {
        self.send(SessionEvent::Pause);
    }

    pub fn resume(&self) {
        self.send(SessionEvent::Resume);
    }

    pub fn skip(&self) {
        self.send(SessionEvent::Skip);
    }

    pub fn toggle_loop(&self) {
        self.send(SessionEvent::ToggleLoop);
    }

    pub fn stop(&self) {
        self.send(SessionEvent::Stop);
    }

    /// Round-trips through the actor, so the returned view reflects
    /// every operation accepted before this call.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, rx) = flume::bounded(1);
        self.send(SessionEvent::Snapshot { reply });
        rx.recv_async().await.ok()
    }

    fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            warn!("Event stream of session {} is closed", self.session_key);
        }
    }
}

/// Spawns the actor task owning one session's state. The task holds its
/// own sender (timers and completion signals post through it), so it
/// lives for the rest of the process — sessions are never torn down.
pub fn spawn(session_key: SessionKey, deps: Arc<PlayerDeps>) -> PlayerHandle {
    let (tx, rx) = flume::unbounded();
    let handle = PlayerHandle {
        session_key: session_key.clone(),
        tx: tx.clone(),
    };

    info!("Starting playback session: {}", session_key);
    tokio::spawn(async move {
        let mut ctx = PlayerContext::new(session_key);
        // One event at a time, each processed to completion before the
        // next is taken.
        while let Ok(event) = rx.recv_async().await {
            handle_event(&mut ctx, event, &deps, &tx).await;
        }
    });

    handle
}

pub(crate) async fn notify(deps: &PlayerDeps, ctx: &PlayerContext, notice: Notice) {
    deps.notifier.notify(&ctx.session_key, notice).await;
}

async fn handle_event(
    ctx: &mut PlayerContext,
    event: SessionEvent,
    deps: &PlayerDeps,
    events: &flume::Sender<SessionEvent>,
) {
    match event {
        SessionEvent::Enqueue { locator, channel } => {
            playback::handle_enqueue(ctx, deps, events, locator, channel).await;
        }
        SessionEvent::Pause => {
            if ctx.state == SessionState::Playing {
                if let Some(conn) = ctx.voice {
                    deps.voice.pause(conn.handle).await;
                }
                ctx.state = SessionState::Paused;
                notify(deps, ctx, Notice::TrackPaused).await;
            } else {
                notify(deps, ctx, Notice::NothingPlaying).await;
            }
        }
        SessionEvent::Resume => {
            if ctx.state == SessionState::Paused {
                if let Some(conn) = ctx.voice {
                    deps.voice.resume(conn.handle).await;
                }
                ctx.state = SessionState::Playing;
                notify(deps, ctx, Notice::TrackResumed).await;
            } else {
                notify(deps, ctx, Notice::NothingPlaying).await;
            }
        }
        SessionEvent::Skip => {
            if ctx.is_active() {
                // Stopping the transport fires the completion signal;
                // selection happens on that event, same as a natural end.
                if let Some(conn) = ctx.voice {
                    deps.voice.stop(conn.handle).await;
                }
            } else {
                notify(deps, ctx, Notice::NothingPlaying).await;
            }
        }
        SessionEvent::ToggleLoop => {
            ctx.is_looping = !ctx.is_looping;
            notify(
                deps,
                ctx,
                Notice::LoopToggled {
                    looping: ctx.is_looping,
                },
            )
            .await;
        }
        SessionEvent::Stop => {
            idle::cancel(ctx);
            ctx.queue.clear();
            ctx.current = None;
            ctx.is_fallback_playback = false;
            if let Some(conn) = ctx.voice.take() {
                deps.voice.stop(conn.handle).await;
                deps.voice.disconnect(conn.handle).await;
            }
            ctx.state = SessionState::Disconnected;
            info!("Stopped session {}", ctx.session_key);
            notify(deps, ctx, Notice::Disconnected).await;
        }
        SessionEvent::TrackFinished { play_id } => {
            if play_id != ctx.play_seq || ctx.current.is_none() {
                trace!(
                    "Discarding stale completion (play {}) for {}",
                    play_id, ctx.session_key
                );
                return;
            }
            playback::play_next(ctx, deps, events).await;
        }
        SessionEvent::IdleTimeout { epoch } => {
            handle_idle_timeout(ctx, deps, epoch).await;
        }
        SessionEvent::Snapshot { reply } => {
            let _ = reply.send(snapshot_of(ctx));
        }
    }
}

/// Acts on an idle-timer fire. Re-validates that the session is still
/// idle with an empty queue and no active playback; a session that woke
/// up in the meantime makes the fire a no-op.
async fn handle_idle_timeout(ctx: &mut PlayerContext, deps: &PlayerDeps, epoch: u64) {
    if epoch != ctx.idle_epoch {
        trace!("Discarding stale idle fire for {}", ctx.session_key);
        return;
    }
    ctx.idle_task = None;

    let still_idle = ctx.state == SessionState::Idle
        && ctx.queue.is_empty()
        && ctx
            .voice
            .map(|conn| !deps.voice.is_playing(conn.handle))
            .unwrap_or(false);
    if !still_idle {
        trace!("Idle fire for {} arrived after activity resumed", ctx.session_key);
        return;
    }

    if let Some(conn) = ctx.voice.take() {
        deps.voice.disconnect(conn.handle).await;
    }
    ctx.state = SessionState::Disconnected;
    info!("Idle timeout reached, disconnected session {}", ctx.session_key);
    notify(deps, ctx, Notice::Disconnected).await;
}

fn snapshot_of(ctx: &PlayerContext) -> SessionSnapshot {
    SessionSnapshot {
        state: ctx.state,
        current_title: ctx.current.as_ref().map(|e| e.title().to_string()),
        is_looping: ctx.is_looping,
        is_fallback_playback: ctx.is_fallback_playback,
        queue_titles: ctx.queue.titles(),
        queue_listing: ctx.queue.listing(),
    }
}
