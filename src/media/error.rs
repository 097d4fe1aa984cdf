use thiserror::Error;

/// Failures reported by the external engine process.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine binary could not be started.
    #[error("Failed to run {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    /// The engine exited unsuccessfully.
    #[error("{0}")]
    Failed(String),

    #[error("Engine did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Failed to parse engine output: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("Failed to get media info for {url}: {source}")]
    Engine {
        url: String,
        #[source]
        source: EngineError,
    },
}

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// Another batch is still in flight.
    #[error("A download is already in progress")]
    Busy,

    #[error("Invalid download settings: {0}")]
    InvalidSettings(String),

    #[error("Download failed: {0}")]
    Engine(#[from] EngineError),
}
