use crate::media::{
    suggestions, Postprocessor, SettingsStore, SettingsUpdate, DEFAULT_BINARY,
    DEFAULT_PROBE_TIMEOUT_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `text` or `json`
    pub format: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub binary: String,
    pub probe_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Download defaults. Unset or blank values keep the built-in defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DownloadConfig {
    pub format: Option<String>,
    pub output_template: Option<String>,
    /// Named presets, applied before `postprocessors`.
    pub presets: Vec<String>,
    pub postprocessors: Vec<Postprocessor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub download: DownloadConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Resolve presets now so a typo fails at startup, not mid-session.
        config.postprocessors()?;
        Ok(config)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    pub fn postprocessors(&self) -> Result<Vec<Postprocessor>> {
        let mut postprocessors = self
            .download
            .presets
            .iter()
            .map(|name| {
                suggestions::preset(name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown postprocessor preset '{}' (expected one of: {})",
                        name,
                        suggestions::PRESET_NAMES.join(", ")
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        postprocessors.extend(self.download.postprocessors.iter().cloned());
        Ok(postprocessors)
    }

    /// Builds the session's settings store from the built-in defaults.
    pub fn settings_store(&self) -> Result<SettingsStore> {
        let mut store = SettingsStore::new();
        store.update(SettingsUpdate {
            format: self.download.format.clone(),
            output_template: self.download.output_template.clone(),
            postprocessors: Some(self.postprocessors()?),
        });
        Ok(store)
    }
}
