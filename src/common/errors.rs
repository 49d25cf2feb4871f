use std::time::Duration;

use thiserror::Error;

use crate::common::types::ChannelId;

/// Failure of a single extraction attempt. Each attempt is independent;
/// the resolver logs these and falls through to the next profile.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extractor returned no result")]
    Empty,
    #[error("extractor output is not valid JSON: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal resolution failure: every configured extraction profile was
/// attempted and none produced a playable stream. Callers must treat the
/// track as unavailable, not retry.
#[derive(Debug, Error)]
#[error("all {attempts} extraction attempts failed for '{source_ref}'")]
pub struct ResolveError {
    pub source_ref: String,
    pub attempts: usize,
}

/// Failures reported by the voice transport.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("cannot connect to voice channel {0}")]
    Connect(ChannelId),
    #[error("cannot move to voice channel {0}")]
    Move(ChannelId),
    #[error("transport rejected play call: {0}")]
    Playback(String),
    #[error("no active voice connection")]
    NotConnected,
}

/// Failures from the text-search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search endpoint returned status {0}")]
    BadStatus(u16),
    #[error("search response could not be parsed: {0}")]
    Malformed(String),
}
