use crate::utils::format_duration;
use std::fmt;

/// Placeholder shown for metadata the engine did not report.
pub const UNKNOWN: &str = "unknown";

/// Metadata returned by a probe. Missing fields stay `None` rather than
/// being defaulted to zero or an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
}

impl MediaInfo {
    pub fn title_or_unknown(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn thumbnail_or_unknown(&self) -> &str {
        self.thumbnail.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_duration(&self) -> String {
        self.duration
            .map(format_duration)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Duration: {}",
            self.title_or_unknown(),
            self.display_duration()
        )
    }
}
