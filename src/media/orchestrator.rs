use super::{downloader::Engine, error::DownloadError, settings::Settings};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Hands a whole batch of URLs to the engine in one call.
///
/// There is no retry and no per-URL result: the batch either completes or
/// the engine's error comes back as [`DownloadError::Engine`]. At most one
/// batch runs at a time; a second concurrent call gets [`DownloadError::Busy`].
#[derive(Clone)]
pub struct Orchestrator {
    engine: Arc<dyn Engine>,
    in_flight: Arc<Mutex<()>>,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn download(&self, urls: &[String], settings: &Settings) -> Result<(), DownloadError> {
        if urls.is_empty() {
            info!("Nothing to download");
            return Ok(());
        }

        settings.validate()?;

        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| DownloadError::Busy)?;

        info!(
            "Starting batch download of {} URL(s) with {}",
            urls.len(),
            self.engine.name()
        );

        match self.engine.download(urls, settings).await {
            Ok(()) => {
                info!("Batch download finished");
                Ok(())
            }
            Err(e) => {
                warn!("Batch download failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{fake::FakeEngine, settings::Postprocessor};

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let engine = Arc::new(FakeEngine::new());
        let orchestrator = Orchestrator::new(engine.clone());

        orchestrator
            .download(&[], &Settings::default())
            .await
            .unwrap();
        assert!(engine.batches().is_empty());
    }

    #[tokio::test]
    async fn test_single_engine_call_per_batch() {
        let engine = Arc::new(FakeEngine::new());
        let orchestrator = Orchestrator::new(engine.clone());
        let batch = urls(&["https://valid/1", "https://valid/2"]);

        orchestrator
            .download(&batch, &Settings::default())
            .await
            .unwrap();
        assert_eq!(engine.batches(), vec![batch]);
    }

    #[tokio::test]
    async fn test_engine_failure_is_download_error() {
        let engine = Arc::new(FakeEngine::new());
        let orchestrator = Orchestrator::new(engine.clone());
        let batch = urls(&["https://valid/1", "https://invalid/x"]);

        let err = orchestrator
            .download(&batch, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Engine(_)));
        assert!(err.to_string().contains("https://invalid/x"));

        // Still usable afterwards.
        assert!(!orchestrator.is_busy());
        orchestrator
            .download(&urls(&["https://valid/3"]), &Settings::default())
            .await
            .unwrap();
        assert_eq!(engine.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_settings_stop_before_engine() {
        let engine = Arc::new(FakeEngine::new());
        let orchestrator = Orchestrator::new(engine.clone());
        let settings = Settings {
            postprocessors: vec![Postprocessor::ExtractAudio {
                codec: "mp4".to_string(),
                quality: None,
                no_overwrites: false,
            }],
            ..Default::default()
        };

        let err = orchestrator
            .download(&urls(&["https://valid/1"]), &settings)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::InvalidSettings(_)));
        assert!(engine.batches().is_empty());
    }

    #[tokio::test]
    async fn test_second_batch_while_in_flight_is_busy() {
        let (engine, gate) = FakeEngine::new().gated();
        let engine = Arc::new(engine);
        let orchestrator = Orchestrator::new(engine.clone());

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .download(&urls(&["https://valid/1"]), &Settings::default())
                    .await
            })
        };

        while engine.batches().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(orchestrator.is_busy());

        let second = orchestrator
            .download(&urls(&["https://valid/2"]), &Settings::default())
            .await;
        assert!(matches!(second, Err(DownloadError::Busy)));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!orchestrator.is_busy());
        assert_eq!(engine.batches().len(), 1);
    }
}
