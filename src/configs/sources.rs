use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SourcesConfig {
  #[serde(default)]
  pub youtube: Option<YouTubeConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YouTubeConfig {
  /// YouTube Data API v3 key used by the search provider.
  pub api_key: String,
  #[serde(default = "default_max_results")]
  pub max_results: u32,
}

fn default_max_results() -> u32 {
  10
}
