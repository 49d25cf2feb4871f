use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::trace;

use super::{ExtractedInfo, ExtractionProfile, StreamExtractor};
use crate::common::errors::ExtractError;
use crate::configs::ResolverConfig;

/// Extractor backed by a `yt-dlp` subprocess in JSON mode (`-j`).
///
/// Each profile maps to the extractor arguments the retry ladder
/// degrades through: full degraded-transport skip, DASH-only skip, and
/// finally `format=worst`.
pub struct YtDlpExtractor {
    binary: String,
    proxy: Option<String>,
    cookies: Option<String>,
}

impl YtDlpExtractor {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            binary: config.ytdlp_binary.clone(),
            proxy: config.proxy.clone(),
            cookies: config.cookies.clone(),
        }
    }

    fn build_args(&self, source_ref: &str, profile: ExtractionProfile) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-j".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--quiet".into(),
            "--no-check-certificates".into(),
            "--skip-download".into(),
        ];

        let (format, extractor_args) = profile_options(profile);
        args.push("--format".into());
        args.push(format.into());
        if let Some(extractor_args) = extractor_args {
            args.push("--extractor-args".into());
            args.push(extractor_args.into());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".into());
            args.push(proxy.clone());
        }
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".into());
            args.push(cookies.clone());
        }

        args.push(source_ref.to_string());
        args
    }
}

/// Format selector and extractor arguments for one ladder rung.
fn profile_options(profile: ExtractionProfile) -> (&'static str, Option<&'static str>) {
    match profile {
        ExtractionProfile::Default => (
            "bestaudio/best",
            Some("youtube:skip=hls,dash;player_skip=configs,webpage"),
        ),
        ExtractionProfile::SkipDegradedTransports => {
            ("bestaudio/best", Some("youtube:skip=dash"))
        }
        ExtractionProfile::LowestQuality => ("worst", None),
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpOutput {
    url: Option<String>,
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
}

impl From<YtDlpOutput> for ExtractedInfo {
    fn from(out: YtDlpOutput) -> Self {
        ExtractedInfo {
            stream_url: out.url,
            title: out.title,
            thumbnail: out.thumbnail,
            duration: out
                .duration
                .filter(|secs| *secs > 0.0)
                .map(Duration::from_secs_f64),
        }
    }
}

#[async_trait]
impl StreamExtractor for YtDlpExtractor {
    async fn extract(
        &self,
        source_ref: &str,
        profile: ExtractionProfile,
    ) -> Result<ExtractedInfo, ExtractError> {
        let args = self.build_args(source_ref, profile);
        trace!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Transport(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.trim();
        if line.is_empty() {
            return Err(ExtractError::Empty);
        }

        let parsed: YtDlpOutput =
            serde_json::from_str(line).map_err(|e| ExtractError::Malformed(e.to_string()))?;
        Ok(parsed.into())
    }
}
