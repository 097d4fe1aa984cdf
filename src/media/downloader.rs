use super::{error::EngineError, settings::Settings};
use async_trait::async_trait;
use serde_json::Value;

/// The external extraction/download engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Human-readable name of the engine
    fn name(&self) -> &'static str;

    /// Fetch the metadata mapping for `url` without downloading anything.
    async fn extract_info(&self, url: &str) -> Result<Value, EngineError>;

    /// Download every URL in one engine session configured from `settings`.
    async fn download(&self, urls: &[String], settings: &Settings) -> Result<(), EngineError>;
}
