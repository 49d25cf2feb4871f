pub mod cache;
pub mod common;
pub mod configs;
pub mod notify;
pub mod player;
pub mod registry;
pub mod resolver;
pub mod sources;
pub mod track;
pub mod voice;

pub use cache::ResolutionCache;
pub use notify::{NotificationSink, Notice};
pub use player::{PlayerDeps, PlayerHandle, SessionSnapshot, SessionState};
pub use registry::SessionRegistry;
pub use resolver::{ExtractionProfile, StreamExtractor, StreamResolver};
pub use sources::SearchProvider;
pub use track::{QueueEntry, ResolvedStream, TrackLocator};
pub use voice::{CompletionSignal, VoiceHandle, VoiceOutput};
