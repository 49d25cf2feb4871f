use async_trait::async_trait;

use crate::common::errors::VoiceError;
use crate::common::types::ChannelId;

/// Opaque handle to one live voice connection. The transport owns the
/// mapping from handle to whatever its connection state actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u64);

/// Fired by the transport exactly once when the stream handed to
/// [`VoiceOutput::play`] stops, whether it finished naturally, was
/// stopped, or failed mid-stream. The orchestrator hands the transport a
/// signal that posts a message back onto the owning session's event
/// stream, so transport-internal threads never run session logic.
pub type CompletionSignal = Box<dyn FnOnce() + Send + 'static>;

/// The external transport that actually connects to voice channels and
/// streams audio into them.
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    async fn connect(&self, channel: ChannelId) -> Result<VoiceHandle, VoiceError>;

    async fn move_to(&self, handle: VoiceHandle, channel: ChannelId) -> Result<(), VoiceError>;

    /// Begins streaming `stream_url`. `on_complete` must be invoked
    /// exactly once when this play instance ends, for any reason.
    async fn play(
        &self,
        handle: VoiceHandle,
        stream_url: &str,
        on_complete: CompletionSignal,
    ) -> Result<(), VoiceError>;

    async fn pause(&self, handle: VoiceHandle);

    async fn resume(&self, handle: VoiceHandle);

    /// Stops the current play instance; the pending completion signal
    /// still fires. A no-op when nothing is playing.
    async fn stop(&self, handle: VoiceHandle);

    async fn disconnect(&self, handle: VoiceHandle);

    fn is_playing(&self, handle: VoiceHandle) -> bool;
}

/// A live connection as the session tracks it: the transport handle plus
/// the channel it currently streams into.
#[derive(Debug, Clone, Copy)]
pub struct VoiceConnection {
    pub handle: VoiceHandle,
    pub channel: ChannelId,
}
