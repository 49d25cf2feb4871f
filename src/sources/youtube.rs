use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::SearchProvider;
use crate::common::errors::SearchError;
use crate::configs::YouTubeConfig;
use crate::track::TrackLocator;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Returns true when the query is already a YouTube watch URL and needs
/// no search round-trip.
pub fn is_watch_url(query: &str) -> bool {
    static WATCH_URL: OnceLock<Regex> = OnceLock::new();
    let re = WATCH_URL.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$").expect("valid regex")
    });
    re.is_match(query)
}

/// Parses an ISO 8601 duration of the `PT#H#M#S` family, the format the
/// Data API reports for `contentDetails.duration`.
pub fn parse_iso8601_duration(value: &str) -> Option<Duration> {
    static ISO8601: OnceLock<Regex> = OnceLock::new();
    let re = ISO8601.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("valid regex")
    });

    let caps = re.captures(value)?;
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let secs = part(1) * 3600 + part(2) * 60 + part(3);
    if secs == 0 && caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }
    Some(Duration::from_secs(secs))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    items: Vec<DetailsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// Search provider over the YouTube Data API v3: one request for the
/// snippet listing, a second joining in per-video durations.
pub struct YouTubeSearch {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeSearch {
    pub fn new(config: &YouTubeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for YouTubeSearch {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<TrackLocator>, SearchError> {
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::BadStatus(response.status().as_u16()));
        }
        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        let video_ids: Vec<String> = search
            .items
            .iter()
            .filter_map(|item| item.id.video_id.clone())
            .collect();
        if video_ids.is_empty() {
            debug!("YouTube search returned no videos for: {}", query);
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let response = self
            .http
            .get(VIDEOS_URL)
            .query(&[
                ("part", "contentDetails"),
                ("id", ids.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::BadStatus(response.status().as_u16()));
        }
        let details: DetailsResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        let durations: HashMap<String, Duration> = details
            .items
            .into_iter()
            .filter_map(|item| {
                parse_iso8601_duration(&item.content_details.duration)
                    .map(|duration| (item.id, duration))
            })
            .collect();

        Ok(candidates_from(search, &durations))
    }
}

fn candidates_from(
    search: SearchResponse,
    durations: &HashMap<String, Duration>,
) -> Vec<TrackLocator> {
    search
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            Some(TrackLocator {
                source_ref: format!("https://www.youtube.com/watch?v={}", video_id),
                title: item.snippet.title,
                duration: durations.get(&video_id).copied(),
                thumbnail: item.snippet.thumbnails.default.map(|t| t.url),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_watch_urls() {
        assert!(is_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_watch_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_watch_url("youtube.com/watch?v=abc"));
        assert!(!is_watch_url("never gonna give you up"));
        assert!(!is_watch_url("https://example.com/watch?v=abc"));
    }

    #[test]
    fn parses_iso8601_durations() {
        assert_eq!(
            parse_iso8601_duration("PT3M32S"),
            Some(Duration::from_secs(212))
        );
        assert_eq!(
            parse_iso8601_duration("PT1H2M3S"),
            Some(Duration::from_secs(3723))
        );
        assert_eq!(parse_iso8601_duration("PT45S"), Some(Duration::from_secs(45)));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_iso8601_duration("not-a-duration"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
    }

    #[test]
    fn joins_search_items_with_durations() {
        let search: SearchResponse = serde_json::from_str(
            r#"{
                "items": [
                    {
                        "id": { "videoId": "dQw4w9WgXcQ" },
                        "snippet": {
                            "title": "Never Gonna Give You Up",
                            "thumbnails": { "default": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg" } }
                        }
                    },
                    {
                        "id": {},
                        "snippet": { "title": "A channel, not a video", "thumbnails": {} }
                    }
                ]
            }"#,
        )
        .expect("sample search response parses");

        let mut durations = HashMap::new();
        durations.insert("dQw4w9WgXcQ".to_string(), Duration::from_secs(212));

        let candidates = candidates_from(search, &durations);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].source_ref,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(candidates[0].title, "Never Gonna Give You Up");
        assert_eq!(candidates[0].duration, Some(Duration::from_secs(212)));
        assert_eq!(
            candidates[0].thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg")
        );
    }
}
