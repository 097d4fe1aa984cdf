use super::{downloader::Engine, error::EngineError, settings::Settings};
use async_trait::async_trait;
use serde_json::Value;
use std::{io, process::Stdio, time::Duration};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_BINARY: &str = "yt-dlp";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Engine backed by the `yt-dlp` executable. Every call is its own process,
/// so nothing is carried over between batches.
pub struct YtDlpEngine {
    binary: String,
    probe_timeout: Duration,
}

/// Result of [`YtDlpEngine::check_availability`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub ytdlp_version: Option<String>,
    pub ffmpeg_version: Option<String>,
}

impl Availability {
    pub fn is_usable(&self) -> bool {
        self.ytdlp_version.is_some()
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(
            DEFAULT_BINARY,
            Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        )
    }
}

impl YtDlpEngine {
    pub fn new(binary: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            probe_timeout,
        }
    }

    fn probe_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--simulate".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    fn download_args(urls: &[String], settings: &Settings) -> Vec<String> {
        let mut args = vec!["--no-warnings".to_string()];
        args.extend(settings.engine_args());
        // Anything after `--` is a URL even if it starts with a dash.
        args.push("--".to_string());
        args.extend(urls.iter().cloned());
        args
    }

    fn spawn_error(&self, e: io::Error) -> EngineError {
        let reason = if e.kind() == io::ErrorKind::NotFound {
            "executable not found, is it installed and on PATH?".to_string()
        } else {
            e.to_string()
        };
        EngineError::Spawn {
            binary: self.binary.clone(),
            reason,
        }
    }

    /// Reports the installed yt-dlp and ffmpeg versions. ffmpeg is optional
    /// but every postprocessor depends on it.
    pub async fn check_availability(&self) -> Availability {
        let ytdlp_version = match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                info!("yt-dlp is available, version: {}", version);
                Some(version)
            }
            Ok(_) => {
                warn!("{} --version failed", self.binary);
                None
            }
            Err(e) => {
                warn!("{} not found: {}", self.binary, e);
                None
            }
        };

        let ffmpeg_version = match Command::new("ffmpeg").arg("-version").output().await {
            Ok(output) if output.status.success() => {
                let version_line = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or("unknown")
                    .to_string();
                info!("ffmpeg is available: {}", version_line);
                Some(version_line)
            }
            Ok(_) => {
                warn!("ffmpeg -version failed");
                None
            }
            Err(e) => {
                warn!("ffmpeg not found: {} (required by postprocessors)", e);
                None
            }
        };

        if ytdlp_version.is_some() && ffmpeg_version.is_none() {
            warn!("Downloads will work but merging and conversion postprocessors will fail");
        }

        Availability {
            ytdlp_version,
            ffmpeg_version,
        }
    }
}

/// Picks the message worth showing out of the engine's stderr: the last
/// `ERROR:` line if any, otherwise everything it printed.
fn engine_message(stderr: &[u8], status: std::process::ExitStatus) -> String {
    let stderr = String::from_utf8_lossy(stderr);

    if let Some(line) = stderr
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with("ERROR:"))
    {
        return line.trim().to_string();
    }

    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("engine exited with {}", status)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl Engine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &str) -> Result<Value, EngineError> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let output = tokio::time::timeout(
            self.probe_timeout,
            Command::new(&self.binary)
                .args(Self::probe_args(url))
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| EngineError::Timeout(self.probe_timeout.as_secs()))?
        .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed(engine_message(
                &output.stderr,
                output.status,
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        debug!("yt-dlp JSON output: {} bytes", json_str.len());

        serde_json::from_str(&json_str).map_err(|e| EngineError::Parse(e.to_string()))
    }

    async fn download(&self, urls: &[String], settings: &Settings) -> Result<(), EngineError> {
        let args = Self::download_args(urls, settings);
        info!("Running {} for {} URL(s)", self.binary, urls.len());
        debug!("yt-dlp arguments: {:?}", args);

        // Progress goes straight to the terminal; stderr is kept for the error.
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed(engine_message(
                &output.stderr,
                output.status,
            )));
        }

        if !output.stderr.is_empty() {
            debug!("yt-dlp stderr: {}", String::from_utf8_lossy(&output.stderr));
        }

        Ok(())
    }
}
