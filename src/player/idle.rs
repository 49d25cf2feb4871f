use std::time::Duration;

use tracing::trace;

use crate::player::context::PlayerContext;
use crate::player::SessionEvent;

/// Schedules the idle disconnect for this session, replacing any timer
/// already outstanding so at most one exists at a time. The fire posts
/// an event onto the session's stream instead of disconnecting inline;
/// the actor re-validates before acting on it.
pub fn schedule(ctx: &mut PlayerContext, events: &flume::Sender<SessionEvent>, delay: Duration) {
    cancel(ctx);

    ctx.idle_epoch += 1;
    let epoch = ctx.idle_epoch;
    let tx = events.clone();
    trace!("Scheduling idle disconnect in {:?} for {}", delay, ctx.session_key);
    ctx.idle_task = Some(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(SessionEvent::IdleTimeout { epoch });
    }));
}

/// Cancels a pending idle timer. Cancelling an absent or already-fired
/// timer is a no-op; a fire already sitting in the event stream is
/// invalidated by the epoch bump.
pub fn cancel(ctx: &mut PlayerContext) {
    if let Some(task) = ctx.idle_task.take() {
        task.abort();
        ctx.idle_epoch += 1;
    }
}
