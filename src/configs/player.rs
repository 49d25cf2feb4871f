use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// Seconds an idle, voice-connected session waits before disconnecting.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Maximum number of resolved streams kept; overflow evicts the
    /// least recently accessed entry.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Seconds a resolved stream stays visible to lookups.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    /// Per-attempt timeout; the resolve call as a whole is bounded by
    /// attempts * this value.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    #[serde(default = "default_ytdlp_binary")]
    pub ytdlp_binary: String,
    /// Forwarded to the extractor as an HTTP proxy when set.
    pub proxy: Option<String>,
    /// Netscape cookie file forwarded to the extractor when set.
    pub cookies: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout_secs(),
            ytdlp_binary: default_ytdlp_binary(),
            proxy: None,
            cookies: None,
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    900
}

fn default_cache_capacity() -> usize {
    100
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_attempt_timeout_secs() -> u64 {
    20
}

fn default_ytdlp_binary() -> String {
    "yt-dlp".to_string()
}
