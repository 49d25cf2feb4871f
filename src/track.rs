use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Immutable reference to a requested track: the canonical source
/// reference used as the resolution key, plus whatever display metadata
/// is known before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLocator {
    /// Canonical source reference (a watch URL or platform identifier).
    pub source_ref: String,
    pub title: String,
    pub duration: Option<Duration>,
    pub thumbnail: Option<String>,
}

impl TrackLocator {
    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// The playable artifact produced by resolving a [`TrackLocator`].
/// Immutable once created; re-resolution after cache expiry produces a
/// new value rather than mutating this one.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub stream_url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<Duration>,
    pub resolved_at: Instant,
}

/// A queued track: its locator enriched at enqueue time with the stream
/// it resolved to, so queue order and audibility are both known up front.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub locator: TrackLocator,
    pub stream: ResolvedStream,
}

impl QueueEntry {
    pub fn new(locator: TrackLocator, stream: ResolvedStream) -> Self {
        Self { locator, stream }
    }

    /// Wraps a cached stream as a synthetic entry for fallback playback.
    /// The locator is rebuilt from the cache key and the stream metadata.
    pub fn from_cached(source_ref: String, stream: ResolvedStream) -> Self {
        Self {
            locator: TrackLocator {
                source_ref,
                title: stream.title.clone(),
                duration: stream.duration,
                thumbnail: stream.thumbnail.clone(),
            },
            stream,
        }
    }

    pub fn title(&self) -> &str {
        &self.stream.title
    }

    pub fn display_duration(&self) -> String {
        format_duration(self.stream.duration)
    }
}

/// Formats a duration as `H:MM:SS` or `M:SS`, with an "Unknown" sentinel
/// when the duration was never learned.
pub fn format_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return "Unknown".to_string();
    };

    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_short_durations_as_minutes_seconds() {
        assert_eq!(format_duration(Some(Duration::from_secs(182))), "3:02");
        assert_eq!(format_duration(Some(Duration::from_secs(59))), "0:59");
    }

    #[test]
    fn formats_long_durations_with_hours() {
        assert_eq!(format_duration(Some(Duration::from_secs(3723))), "1:02:03");
    }

    #[test]
    fn missing_duration_uses_unknown_sentinel() {
        assert_eq!(format_duration(None), "Unknown");
    }

    #[test]
    fn cached_entry_rebuilds_locator_from_stream() {
        let stream = ResolvedStream {
            stream_url: "https://cdn.example/audio".to_string(),
            title: "Cached Song".to_string(),
            thumbnail: Some("https://i.example/t.jpg".to_string()),
            duration: Some(Duration::from_secs(212)),
            resolved_at: Instant::now(),
        };

        let entry = QueueEntry::from_cached("https://www.youtube.com/watch?v=x".into(), stream);
        assert_eq!(entry.locator.title, "Cached Song");
        assert_eq!(entry.locator.source_ref, "https://www.youtube.com/watch?v=x");
        assert_eq!(entry.display_duration(), "3:32");
    }
}
