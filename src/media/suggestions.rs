//! Reference values for download settings.
//!
//! Nothing here is enforced; it is what the `suggestions` command prints and
//! where named postprocessor presets come from.

use super::settings::Postprocessor;
use std::fmt::Write;

pub const FORMATS: &[&str] = &[
    "best",
    "worst",
    "bestvideo[height=quality_video]+bestaudio[abr=quality_audio]/best",
];

pub const VIDEO_QUALITIES: &[u32] = &[144, 240, 360, 480, 720, 1080, 1440, 2160];
pub const AUDIO_QUALITIES: &[u32] = &[48, 96, 128, 192, 256, 320];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov", "flv"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "3gp"];

pub const PRESET_NAMES: &[&str] = &[
    "audio_extract_mp3",
    "audio_convert_mp3",
    "video_convert_mp4",
    "merger",
];

/// Builds the quality-pinned format selector, falling back to `best` when
/// the exact streams are unavailable.
pub fn quality_format(video_height: u32, audio_bitrate: u32) -> String {
    format!(
        "bestvideo[height={}]+bestaudio[abr={}]/best",
        video_height, audio_bitrate
    )
}

pub fn preset(name: &str) -> Option<Postprocessor> {
    let pp = match name {
        "audio_extract_mp3" => Postprocessor::ExtractAudio {
            codec: "mp3".to_string(),
            quality: Some("192".to_string()),
            no_overwrites: true,
        },
        "audio_convert_mp3" => Postprocessor::ConvertVideo {
            format: "mp3".to_string(),
            no_overwrites: true,
        },
        "video_convert_mp4" => Postprocessor::ConvertVideo {
            format: "mp4".to_string(),
            no_overwrites: true,
        },
        "merger" => Postprocessor::Merge {
            format: "mp4".to_string(),
        },
        _ => return None,
    };
    Some(pp)
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Formats:");
    for format in FORMATS {
        let _ = writeln!(out, "  {}", format);
    }
    let _ = writeln!(out, "Video qualities (height): {}", join(VIDEO_QUALITIES));
    let _ = writeln!(out, "Audio qualities (kbps):   {}", join(AUDIO_QUALITIES));
    let _ = writeln!(out, "Video extensions: {}", join(VIDEO_EXTENSIONS));
    let _ = writeln!(out, "Audio extensions: {}", join(AUDIO_EXTENSIONS));
    let _ = writeln!(out, "Postprocessor presets:");
    for name in PRESET_NAMES {
        if let Some(pp) = preset(name) {
            let _ = writeln!(out, "  {:<18} {}", name, pp);
        }
    }
    out
}
