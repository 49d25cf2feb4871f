use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub player: PlayerConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub resolver: ResolverConfig,
  #[serde(default)]
  pub sources: SourcesConfig,
  pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
  /// Log level when RUST_LOG is unset (trace/debug/info/warn/error).
  pub level: Option<String>,
  /// Optional log file path, appended to alongside stdout.
  pub file: Option<String>,
}

use crate::common::types::AnyResult;

impl Config {
  pub fn load() -> AnyResult<Self> {
    let config_path = if std::path::Path::new("config.toml").exists() {
      "config.toml"
    } else if std::path::Path::new("config.default.toml").exists() {
      "config.default.toml"
    } else {
      return Err("config.toml or config.default.toml not found".into());
    };

    tracing::info!("Loading configuration from: {}", config_path);

    let config_str = std::fs::read_to_string(config_path)?;
    if config_str.is_empty() {
      return Err(format!("{} is empty", config_path).into());
    }

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_yields_defaults() {
    let config: Config = toml::from_str("").expect("empty config should parse");
    assert_eq!(config.cache.capacity, 100);
    assert_eq!(config.cache.ttl_secs, 3600);
    assert_eq!(config.player.idle_timeout_secs, 900);
    assert!(config.logging.is_none());
  }

  #[test]
  fn knobs_override_defaults() {
    let config: Config = toml::from_str(
      r#"
        [cache]
        capacity = 8
        ttl_secs = 60

        [player]
        idle_timeout_secs = 30

        [resolver]
        attempt_timeout_secs = 5

        [logging]
        level = "debug"
      "#,
    )
    .expect("config should parse");

    assert_eq!(config.cache.capacity, 8);
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.player.idle_timeout_secs, 30);
    assert_eq!(config.resolver.attempt_timeout_secs, 5);
    assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
  }
}
