use super::error::DownloadError;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;

const AUDIO_CODECS: &[&str] = &[
    "best", "aac", "alac", "flac", "m4a", "mp3", "opus", "vorbis", "wav",
];

const RECODE_FORMATS: &[&str] = &[
    "avi", "flv", "gif", "mkv", "mov", "mp4", "webm", "aac", "aiff", "alac", "flac", "m4a", "mka",
    "mp3", "ogg", "opus", "vorbis", "wav",
];

const MERGE_FORMATS: &[&str] = &["avi", "flv", "mkv", "mov", "mp4", "webm"];

/// A transformation the engine applies after the raw download.
///
/// Field names follow the engine's own option keys so descriptors can be
/// copied straight out of its documentation into the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key")]
pub enum Postprocessor {
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        #[serde(rename = "preferredcodec")]
        codec: String,
        #[serde(
            rename = "preferredquality",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        quality: Option<String>,
        #[serde(rename = "nopostoverwrites", default)]
        no_overwrites: bool,
    },
    #[serde(rename = "FFmpegVideoConvertor")]
    ConvertVideo {
        #[serde(rename = "preferedformat")]
        format: String,
        #[serde(rename = "nopostoverwrites", default)]
        no_overwrites: bool,
    },
    #[serde(rename = "FFmpegMerger")]
    Merge {
        #[serde(rename = "preferedformat")]
        format: String,
    },
}

impl Postprocessor {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ExtractAudio { .. } => "FFmpegExtractAudio",
            Self::ConvertVideo { .. } => "FFmpegVideoConvertor",
            Self::Merge { .. } => "FFmpegMerger",
        }
    }

    pub fn validate(&self) -> Result<(), DownloadError> {
        let (value, allowed) = match self {
            Self::ExtractAudio { codec, .. } => (codec, AUDIO_CODECS),
            Self::ConvertVideo { format, .. } => (format, RECODE_FORMATS),
            Self::Merge { format } => (format, MERGE_FORMATS),
        };

        if !allowed.contains(&value.as_str()) {
            return Err(DownloadError::InvalidSettings(format!(
                "{} does not support '{}' (expected one of: {})",
                self.key(),
                value,
                allowed.join(", ")
            )));
        }

        if let Self::ExtractAudio {
            quality: Some(quality),
            ..
        } = self
        {
            let digits = quality.trim_end_matches(['k', 'K']);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(DownloadError::InvalidSettings(format!(
                    "Audio quality '{}' is not a number or bitrate",
                    quality
                )));
            }
        }

        Ok(())
    }

    /// Engine command-line arguments equivalent to this descriptor.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            Self::ExtractAudio {
                codec,
                quality,
                no_overwrites,
            } => {
                args.extend(["--extract-audio".to_string(), "--audio-format".to_string()]);
                args.push(codec.clone());
                if let Some(quality) = quality {
                    args.push("--audio-quality".to_string());
                    args.push(quality.clone());
                }
                if *no_overwrites {
                    args.push("--no-post-overwrites".to_string());
                }
            }
            Self::ConvertVideo {
                format,
                no_overwrites,
            } => {
                args.push("--recode-video".to_string());
                args.push(format.clone());
                if *no_overwrites {
                    args.push("--no-post-overwrites".to_string());
                }
            }
            Self::Merge { format } => {
                args.push("--merge-output-format".to_string());
                args.push(format.clone());
            }
        }
        args
    }
}

impl fmt::Display for Postprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtractAudio { codec, quality, .. } => match quality {
                Some(q) => write!(f, "{} ({} @ {})", self.key(), codec, q),
                None => write!(f, "{} ({})", self.key(), codec),
            },
            Self::ConvertVideo { format, .. } | Self::Merge { format } => {
                write!(f, "{} ({})", self.key(), format)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub format: String,
    pub output_template: String,
    pub postprocessors: Vec<Postprocessor>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: "best".to_string(),
            output_template: utils::default_output_template(),
            postprocessors: Vec::new(),
        }
    }
}

impl Settings {
    /// Checked right before the engine is invoked; nothing earlier inspects
    /// the values.
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.format.trim().is_empty() {
            return Err(DownloadError::InvalidSettings(
                "format selector cannot be empty".to_string(),
            ));
        }
        if self.output_template.trim().is_empty() {
            return Err(DownloadError::InvalidSettings(
                "output template cannot be empty".to_string(),
            ));
        }
        self.postprocessors.iter().try_for_each(|pp| pp.validate())
    }

    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            self.format.clone(),
            "--output".to_string(),
            self.output_template.clone(),
        ];
        for pp in &self.postprocessors {
            args.extend(pp.engine_args());
        }
        args
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format:          {}", self.format)?;
        writeln!(f, "Output template: {}", self.output_template)?;
        if self.postprocessors.is_empty() {
            write!(f, "Postprocessors:  none")
        } else {
            write!(f, "Postprocessors:")?;
            for (i, pp) in self.postprocessors.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, pp)?;
            }
            Ok(())
        }
    }
}

/// Partial update for [`SettingsStore::update`]. `None`, blank strings and
/// empty lists leave the current value in place.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub format: Option<String>,
    pub output_template: Option<String>,
    pub postprocessors: Option<Vec<Postprocessor>>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: Settings,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, update: SettingsUpdate) {
        if let Some(format) = update.format.filter(|f| !f.trim().is_empty()) {
            self.settings.format = format;
        }

        if let Some(template) = update
            .output_template
            .filter(|t| !t.trim().is_empty())
        {
            self.settings.output_template = utils::expand_home(&template);
        }

        if let Some(postprocessors) = update.postprocessors.filter(|p| !p.is_empty()) {
            self.settings.postprocessors = postprocessors;
        }
    }

    pub fn current(&self) -> Settings {
        self.settings.clone()
    }
}
