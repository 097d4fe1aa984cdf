//! Scripted engine used by the unit tests.

use super::{downloader::Engine, error::EngineError, settings::Settings};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::Notify;

/// Probes succeed only for URLs registered with [`FakeEngine::with_info`].
/// Downloads fail as soon as the batch contains a URL with `invalid` in it.
#[derive(Default)]
pub struct FakeEngine {
    infos: HashMap<String, Value>,
    gate: Option<Arc<Notify>>,
    probes: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, url: &str, info: Value) -> Self {
        self.infos.insert(url.to_string(), info);
        self
    }

    /// Downloads block until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract_info(&self, url: &str) -> Result<Value, EngineError> {
        self.probes.lock().unwrap().push(url.to_string());
        self.infos
            .get(url)
            .cloned()
            .ok_or_else(|| EngineError::Failed(format!("ERROR: Unsupported URL: {}", url)))
    }

    async fn download(&self, urls: &[String], _settings: &Settings) -> Result<(), EngineError> {
        self.batches.lock().unwrap().push(urls.to_vec());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match urls.iter().find(|url| url.contains("invalid")) {
            Some(url) => Err(EngineError::Failed(format!(
                "ERROR: Unsupported URL: {}",
                url
            ))),
            None => Ok(()),
        }
    }
}
