use super::{
    downloader::Engine,
    error::ProbeError,
    types::MediaInfo,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Metadata-only lookups against the engine.
#[derive(Clone)]
pub struct InfoFetcher {
    engine: Arc<dyn Engine>,
}

impl InfoFetcher {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub async fn probe(&self, url: &str) -> Result<MediaInfo, ProbeError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ProbeError::EmptyUrl);
        }

        debug!("Probing {} with {}", url, self.engine.name());

        let json = self.engine.extract_info(url).await.map_err(|source| {
            warn!("Probe failed for {}: {}", url, source);
            ProbeError::Engine {
                url: url.to_string(),
                source,
            }
        })?;

        Ok(normalize(&json))
    }
}

fn normalize(json: &Value) -> MediaInfo {
    MediaInfo {
        title: json["title"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string()),
        // Durations come back as floats for some extractors.
        duration: json["duration"]
            .as_u64()
            .or_else(|| json["duration"].as_f64().filter(|d| *d >= 0.0).map(|d| d as u64)),
        thumbnail: json["thumbnail"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string()),
    }
}
