mod downloader;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod info;
mod orchestrator;
mod queue;
mod settings;
pub mod suggestions;
mod types;
mod ytdlp;

pub use downloader::Engine;
pub use error::DownloadError;
pub use queue::UrlQueue;
pub use settings::{Postprocessor, SettingsStore, SettingsUpdate};
pub use ytdlp::{YtDlpEngine, DEFAULT_BINARY, DEFAULT_PROBE_TIMEOUT_SECS};

use info::InfoFetcher;
use orchestrator::Orchestrator;
use ytdlp::Availability;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Everything a shell needs: one engine shared by the probe and download
/// paths, plus the session's settings.
pub struct MediaDownloader {
    pub fetcher: InfoFetcher,
    pub orchestrator: Orchestrator,
    pub settings: SettingsStore,
}

impl MediaDownloader {
    pub fn new(engine: Arc<dyn Engine>, settings: SettingsStore) -> Self {
        info!("Media downloader initialized with {}", engine.name());

        Self {
            fetcher: InfoFetcher::new(engine.clone()),
            orchestrator: Orchestrator::new(engine),
            settings,
        }
    }

    /// Downloads the queued URLs and clears the queue only on success.
    pub async fn download_queue(&self, queue: &mut UrlQueue) -> Result<(), DownloadError> {
        self.orchestrator
            .download(queue.all(), &self.settings.current())
            .await?;
        queue.clear();
        Ok(())
    }

    pub async fn test_setup(engine: &YtDlpEngine) -> Result<Availability> {
        info!("Testing media downloader setup...");

        let availability = engine.check_availability().await;
        if availability.is_usable() {
            Ok(availability)
        } else {
            Err(anyhow::anyhow!(
                "yt-dlp is not available. Please install yt-dlp (and ffmpeg for postprocessing)."
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fake::FakeEngine;

    #[tokio::test]
    async fn test_failed_batch_keeps_queue_and_session_usable() {
        let engine = Arc::new(FakeEngine::new());
        let downloader = MediaDownloader::new(engine.clone(), SettingsStore::new());

        let mut queue = UrlQueue::new();
        queue.replace(["https://valid/1", "https://invalid/x"]);

        let err = downloader.download_queue(&mut queue).await.unwrap_err();
        assert!(err.to_string().contains("https://invalid/x"));
        assert_eq!(queue.all(), ["https://valid/1", "https://invalid/x"]);

        queue.replace(["https://valid/1"]);
        downloader.download_queue(&mut queue).await.unwrap();
        assert!(queue.is_empty());
        assert_eq!(engine.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_download_skips_engine() {
        let engine = Arc::new(FakeEngine::new());
        let downloader = MediaDownloader::new(engine.clone(), SettingsStore::new());

        let mut queue = UrlQueue::new();
        downloader.download_queue(&mut queue).await.unwrap();
        assert!(engine.batches().is_empty());
    }
}
