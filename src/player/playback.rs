use tracing::{debug, error, info, warn};

use crate::common::types::ChannelId;
use crate::notify::Notice;
use crate::player::context::{PlayerContext, SessionState};
use crate::player::{PlayerDeps, SessionEvent, idle, notify};
use crate::track::{QueueEntry, TrackLocator};
use crate::voice::{CompletionSignal, VoiceConnection};

/// Accepts a track request: connects (or moves) voice if needed,
/// resolves the locator eagerly, then either appends to the queue or
/// starts playing immediately. Any outstanding idle timer is cancelled
/// up front, even if the request later fails.
pub async fn handle_enqueue(
    ctx: &mut PlayerContext,
    deps: &PlayerDeps,
    events: &flume::Sender<SessionEvent>,
    locator: TrackLocator,
    channel: ChannelId,
) {
    idle::cancel(ctx);

    match ctx.voice {
        None => match deps.voice.connect(channel).await {
            Ok(handle) => {
                ctx.voice = Some(VoiceConnection { handle, channel });
                ctx.state = SessionState::Idle;
            }
            Err(e) => {
                error!("Voice connect failed for {}: {}", ctx.session_key, e);
                notify(deps, ctx, Notice::VoiceConnectFailed).await;
                return;
            }
        },
        Some(conn) if conn.channel != channel => {
            match deps.voice.move_to(conn.handle, channel).await {
                Ok(()) => {
                    ctx.voice = Some(VoiceConnection {
                        handle: conn.handle,
                        channel,
                    });
                }
                Err(e) => {
                    error!("Voice move failed for {}: {}", ctx.session_key, e);
                    notify(deps, ctx, Notice::VoiceConnectFailed).await;
                    return;
                }
            }
        }
        Some(_) => {}
    }

    let stream = match deps.resolver.resolve(&locator).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Track unavailable for {}: {}", ctx.session_key, e);
            notify(
                deps,
                ctx,
                Notice::ResolutionFailed {
                    title: locator.title.clone(),
                },
            )
            .await;
            return;
        }
    };

    ctx.played_history.push(locator.clone());
    let entry = QueueEntry::new(locator, stream);

    if ctx.is_active() {
        ctx.queue.push(entry);
        notify(
            deps,
            ctx,
            Notice::QueueChanged {
                listing: ctx.queue.listing(),
            },
        )
        .await;
    } else {
        ctx.current = Some(entry);
        ctx.is_fallback_playback = false;
        start_current(ctx, deps, events).await;
    }
}

/// Chooses what plays after the current track ends, in priority order:
/// loop replay, queue head, random cache entry, or nothing (idle).
pub async fn play_next(
    ctx: &mut PlayerContext,
    deps: &PlayerDeps,
    events: &flume::Sender<SessionEvent>,
) {
    if ctx.is_looping && ctx.current.is_some() {
        debug!("Looping current track for {}", ctx.session_key);
        ctx.is_fallback_playback = false;
        start_current(ctx, deps, events).await;
        return;
    }

    if let Some(next) = ctx.queue.pop() {
        ctx.current = Some(next);
        ctx.is_fallback_playback = false;
        start_current(ctx, deps, events).await;
        return;
    }

    if let Some((source_ref, stream)) = deps.cache.random_entry() {
        info!(
            "Queue exhausted for {}, replaying from the resolution cache",
            ctx.session_key
        );
        ctx.current = Some(QueueEntry::from_cached(source_ref, stream));
        ctx.is_fallback_playback = true;
        start_current(ctx, deps, events).await;
        return;
    }

    // Nothing to play at all: go idle and arm the disconnect timer.
    ctx.current = None;
    ctx.is_fallback_playback = false;
    ctx.state = if ctx.voice.is_some() {
        SessionState::Idle
    } else {
        SessionState::Disconnected
    };
    notify(
        deps,
        ctx,
        Notice::IdleWarning {
            timeout_secs: deps.idle_timeout.as_secs(),
        },
    )
    .await;
    idle::schedule(ctx, events, deps.idle_timeout);
}

/// Issues the play command for `ctx.current`. On success the session is
/// `Playing`; on transport rejection the failure is reported and a
/// completion for this play instance is posted so the selector moves on,
/// exactly as if the track had finished.
async fn start_current(
    ctx: &mut PlayerContext,
    deps: &PlayerDeps,
    events: &flume::Sender<SessionEvent>,
) {
    let Some(entry) = ctx.current.clone() else {
        return;
    };
    let Some(conn) = ctx.voice else {
        warn!("No voice connection to play on for {}", ctx.session_key);
        return;
    };

    let play_id = ctx.next_play_id();
    let tx = events.clone();
    let on_complete: CompletionSignal = Box::new(move || {
        let _ = tx.send(SessionEvent::TrackFinished { play_id });
    });

    match deps
        .voice
        .play(conn.handle, &entry.stream.stream_url, on_complete)
        .await
    {
        Ok(()) => {
            ctx.state = SessionState::Playing;
            info!(
                "Now playing for {}: {} ({})",
                ctx.session_key,
                entry.title(),
                if ctx.is_fallback_playback { "cache replay" } else { "queue" }
            );
            notify(
                deps,
                ctx,
                Notice::TrackStarted {
                    title: entry.title().to_string(),
                    duration: entry.display_duration(),
                    from_cache: ctx.is_fallback_playback,
                },
            )
            .await;
        }
        Err(e) => {
            error!(
                "Play command failed for {} ({}): {}",
                ctx.session_key,
                entry.title(),
                e
            );
            notify(
                deps,
                ctx,
                Notice::PlaybackFailed {
                    title: entry.title().to_string(),
                },
            )
            .await;
            let _ = events.send(SessionEvent::TrackFinished { play_id });
        }
    }
}
