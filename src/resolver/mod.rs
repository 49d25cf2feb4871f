use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::cache::ResolutionCache;
use crate::common::errors::{ExtractError, ResolveError};
use crate::configs::ResolverConfig;
use crate::track::{ResolvedStream, TrackLocator};

pub mod ytdlp;

pub use ytdlp::YtDlpExtractor;

/// One rung of the extraction retry ladder. Profiles are tried in order;
/// each degrades the request further in exchange for reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionProfile {
    /// Best audio, degraded transports (HLS/DASH) skipped entirely.
    Default,
    /// Best audio, only DASH skipped.
    SkipDegradedTransports,
    /// Whatever plays at all.
    LowestQuality,
}

impl ExtractionProfile {
    /// The fixed attempt order used when none is configured explicitly.
    pub const LADDER: [ExtractionProfile; 3] = [
        ExtractionProfile::Default,
        ExtractionProfile::SkipDegradedTransports,
        ExtractionProfile::LowestQuality,
    ];
}

/// Raw result of one extraction attempt, before the resolver validates
/// it and fills display metadata from the locator.
#[derive(Debug, Clone, Default)]
pub struct ExtractedInfo {
    pub stream_url: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<Duration>,
}

/// Backend that turns a canonical source reference into stream info
/// under a given extraction profile.
#[async_trait]
pub trait StreamExtractor: Send + Sync {
    async fn extract(
        &self,
        source_ref: &str,
        profile: ExtractionProfile,
    ) -> Result<ExtractedInfo, ExtractError>;
}

/// Turns a [`TrackLocator`] into a playable [`ResolvedStream`].
///
/// Consults the shared resolution cache first; on a miss, walks the
/// profile ladder, each attempt bounded by its own timeout. The first
/// attempt yielding a non-empty stream URL wins and is written back to
/// the cache. Exhausting the ladder is terminal for this call.
pub struct StreamResolver {
    extractor: Arc<dyn StreamExtractor>,
    cache: Arc<ResolutionCache>,
    profiles: Vec<ExtractionProfile>,
    attempt_timeout: Duration,
}

impl StreamResolver {
    pub fn new(
        extractor: Arc<dyn StreamExtractor>,
        cache: Arc<ResolutionCache>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            extractor,
            cache,
            profiles: ExtractionProfile::LADDER.to_vec(),
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub async fn resolve(&self, locator: &TrackLocator) -> Result<ResolvedStream, ResolveError> {
        if let Some(hit) = self.cache.get(&locator.source_ref) {
            debug!("Resolution cache hit for: {}", locator.source_ref);
            return Ok(hit);
        }

        for (attempt, profile) in self.profiles.iter().enumerate() {
            let attempt = attempt + 1;
            debug!(
                "Extraction attempt {} ({:?}) for: {}",
                attempt, profile, locator.source_ref
            );

            let outcome =
                tokio::time::timeout(self.attempt_timeout, self.extractor.extract(&locator.source_ref, *profile))
                    .await
                    .unwrap_or(Err(ExtractError::Timeout(self.attempt_timeout)));

            let info = match outcome {
                Ok(info) => info,
                Err(e) => {
                    warn!(
                        "Extraction attempt {} failed for {}: {}",
                        attempt, locator.source_ref, e
                    );
                    continue;
                }
            };

            let Some(stream_url) = info.stream_url.filter(|url| !url.is_empty()) else {
                warn!(
                    "Extraction attempt {} for {} produced no stream url",
                    attempt, locator.source_ref
                );
                continue;
            };

            let stream = ResolvedStream {
                stream_url,
                title: info.title.unwrap_or_else(|| locator.title.clone()),
                thumbnail: info.thumbnail.or_else(|| locator.thumbnail.clone()),
                duration: info.duration.or(locator.duration),
                resolved_at: Instant::now(),
            };

            self.cache.put(&locator.source_ref, stream.clone());
            info!(
                "Resolved {} on attempt {} ({:?})",
                locator.source_ref, attempt, profile
            );
            return Ok(stream);
        }

        error!(
            "All {} extraction attempts failed for: {}",
            self.profiles.len(),
            locator.source_ref
        );
        Err(ResolveError {
            source_ref: locator.source_ref.clone(),
            attempts: self.profiles.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    struct ScriptedExtractor {
        script: Mutex<Vec<Result<ExtractedInfo, ExtractError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedExtractor {
        fn new(script: Vec<Result<ExtractedInfo, ExtractError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StreamExtractor for ScriptedExtractor {
        async fn extract(
            &self,
            _source_ref: &str,
            _profile: ExtractionProfile,
        ) -> Result<ExtractedInfo, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            if script.is_empty() {
                Err(ExtractError::Empty)
            } else {
                script.remove(0)
            }
        }
    }

    fn success(url: &str) -> Result<ExtractedInfo, ExtractError> {
        Ok(ExtractedInfo {
            stream_url: Some(url.to_string()),
            title: Some("Extracted Title".to_string()),
            thumbnail: None,
            duration: Some(Duration::from_secs(200)),
        })
    }

    fn locator() -> TrackLocator {
        TrackLocator {
            source_ref: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            title: "Requested Title".to_string(),
            duration: None,
            thumbnail: None,
        }
    }

    fn resolver(extractor: Arc<ScriptedExtractor>) -> StreamResolver {
        StreamResolver::new(
            extractor,
            Arc::new(ResolutionCache::new(10, Duration::from_secs(60))),
            &ResolverConfig::default(),
        )
    }

    #[tokio::test]
    async fn first_successful_attempt_short_circuits() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![success("https://cdn/a")]));
        let resolver = resolver(extractor.clone());

        let stream = resolver.resolve(&locator()).await.expect("should resolve");
        assert_eq!(stream.stream_url, "https://cdn/a");
        assert_eq!(stream.title, "Extracted Title");
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn falls_through_missing_stream_urls_to_later_attempt() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![
            Ok(ExtractedInfo::default()),
            Err(ExtractError::Transport("connection reset".to_string())),
            success("https://cdn/third"),
        ]));
        let resolver = resolver(extractor.clone());

        let stream = resolver.resolve(&locator()).await.expect("third attempt wins");
        assert_eq!(stream.stream_url, "https://cdn/third");
        assert_eq!(extractor.calls(), 3);

        // The winning stream was written back to the cache.
        assert!(resolver.cache().get(&locator().source_ref).is_some());
    }

    #[tokio::test]
    async fn exhaustion_attempts_every_profile_then_fails_terminally() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![
            Err(ExtractError::Empty),
            Err(ExtractError::Empty),
            Err(ExtractError::Empty),
        ]));
        let resolver = resolver(extractor.clone());

        let err = resolver.resolve(&locator()).await.expect_err("must exhaust");
        assert_eq!(err.attempts, ExtractionProfile::LADDER.len());
        assert_eq!(extractor.calls(), ExtractionProfile::LADDER.len());
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn cache_hit_returns_without_touching_the_extractor() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![success("https://cdn/a")]));
        let resolver = resolver(extractor.clone());

        resolver.resolve(&locator()).await.expect("first resolve");
        let again = resolver.resolve(&locator()).await.expect("cached resolve");

        assert_eq!(again.stream_url, "https://cdn/a");
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn metadata_gaps_fall_back_to_the_locator() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![Ok(ExtractedInfo {
            stream_url: Some("https://cdn/a".to_string()),
            title: None,
            thumbnail: None,
            duration: None,
        })]));
        let mut wanted = locator();
        wanted.duration = Some(Duration::from_secs(123));
        wanted.thumbnail = Some("https://i.example/t.jpg".to_string());

        let stream = resolver(extractor).resolve(&wanted).await.expect("resolves");
        assert_eq!(stream.title, "Requested Title");
        assert_eq!(stream.duration, Some(Duration::from_secs(123)));
        assert_eq!(stream.thumbnail.as_deref(), Some("https://i.example/t.jpg"));
    }
}
