use async_trait::async_trait;

use crate::common::errors::SearchError;
use crate::track::TrackLocator;

pub mod youtube;

pub use youtube::YouTubeSearch;

/// Text-search collaborator: turns a free-text query into an ordered
/// list of track candidates the front-end can offer for selection.
/// Candidates have the same shape as a [`TrackLocator`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<TrackLocator>, SearchError>;
}
