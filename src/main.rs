use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod media;
mod shell;
mod utils;

use config::Config;
use media::{suggestions, MediaDownloader, SettingsUpdate, UrlQueue, YtDlpEngine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Numbered console menu (the default)
    Menu,
    /// Interactive URL list with background downloads
    List,
    /// Download the given URLs in one batch
    Download {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Format selector, e.g. "worst" or "bestaudio"
        #[arg(short, long)]
        format: Option<String>,
        /// Pin the video height, e.g. 720 (use with --audio-bitrate)
        #[arg(long, requires = "audio_bitrate", conflicts_with = "format")]
        video_height: Option<u32>,
        /// Pin the audio bitrate in kbps, e.g. 128 (use with --video-height)
        #[arg(long, requires = "video_height", conflicts_with = "format")]
        audio_bitrate: Option<u32>,
        /// Output path template, e.g. "~/Music/%(title)s.%(ext)s"
        #[arg(short, long)]
        output: Option<String>,
        /// Named postprocessor preset; repeat to chain several
        #[arg(short, long = "preset")]
        presets: Vec<String>,
    },
    /// Show title, duration and thumbnail without downloading
    Info { url: String },
    /// Check that yt-dlp and ffmpeg are installed
    Check,
    /// Print suggested formats, qualities and postprocessor presets
    Suggestions,
}

fn get_config_path(args: &Args) -> Option<String> {
    resolve_config_path(
        args.config.as_deref(),
        std::env::var("MEDIA_CATCHER_CONFIG").ok(),
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
    )
}

fn resolve_config_path(
    explicit: Option<&str>,
    env_path: Option<String>,
    xdg_config_home: Option<String>,
    home: Option<PathBuf>,
) -> Option<String> {
    if let Some(path) = explicit {
        return Some(path.to_string());
    }

    if let Some(path) = env_path {
        return Some(path);
    }

    if let Some(xdg_config_home) = xdg_config_home {
        let config_path = format!("{}/media-catcher/config.toml", xdg_config_home);
        if Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = home {
        let config_path = format!("{}/.config/media-catcher/config.toml", home.display());
        if Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

/// `--format` wins; otherwise a pinned height and bitrate build the selector.
fn resolve_format(
    format: Option<String>,
    video_height: Option<u32>,
    audio_bitrate: Option<u32>,
) -> Option<String> {
    match (format, video_height, audio_bitrate) {
        (Some(format), _, _) => Some(format),
        (None, Some(height), Some(bitrate)) => Some(suggestions::quality_format(height, bitrate)),
        _ => None,
    }
}

fn init_logging(config: &Config) {
    let level = config
        .logging
        .level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout belongs to the shells' prompts.
    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn preset_postprocessors(names: &[String]) -> Result<Vec<media::Postprocessor>> {
    names
        .iter()
        .map(|name| {
            suggestions::preset(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown preset '{}' (expected one of: {})",
                    name,
                    suggestions::PRESET_NAMES.join(", ")
                )
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let config = match &config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    init_logging(&config);

    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults"),
    }

    let engine = Arc::new(YtDlpEngine::new(
        config.engine.binary.clone(),
        Duration::from_secs(config.engine.probe_timeout_secs),
    ));
    let settings = config.settings_store()?;

    match args.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let downloader = MediaDownloader::new(engine, settings);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::ConsoleShell::new(stdin, tokio::io::stdout(), downloader)
                .run()
                .await?;
        }
        Commands::List => {
            let downloader = MediaDownloader::new(engine, settings);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::ListShell::new(stdin, tokio::io::stdout(), downloader)
                .run()
                .await?;
        }
        Commands::Download {
            urls,
            format,
            video_height,
            audio_bitrate,
            output,
            presets,
        } => {
            let mut downloader = MediaDownloader::new(engine, settings);
            downloader.settings.update(SettingsUpdate {
                format: resolve_format(format, video_height, audio_bitrate),
                output_template: output,
                postprocessors: Some(preset_postprocessors(&presets)?),
            });

            let mut queue = UrlQueue::new();
            queue.replace(urls);
            downloader.download_queue(&mut queue).await?;
            println!("Media downloaded successfully");
        }
        Commands::Info { url } => {
            let downloader = MediaDownloader::new(engine, settings);
            let media = downloader.fetcher.probe(&url).await?;
            println!("Title:     {}", media.title_or_unknown());
            println!("Duration:  {}", media.display_duration());
            println!("Thumbnail: {}", media.thumbnail_or_unknown());
        }
        Commands::Check => {
            let availability = MediaDownloader::test_setup(&engine).await?;
            if let Some(version) = &availability.ytdlp_version {
                println!("yt-dlp: {}", version);
            }
            match &availability.ffmpeg_version {
                Some(version) => println!("ffmpeg: {}", version),
                None => println!("ffmpeg: not found (postprocessors will fail)"),
            }
        }
        Commands::Suggestions => print!("{}", suggestions::render()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_to_menu() {
        let args = Args::parse_from(["media-catcher"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_download_args() {
        let args = Args::parse_from([
            "media-catcher",
            "download",
            "-f",
            "worst",
            "--preset",
            "audio_extract_mp3",
            "--preset",
            "merger",
            "https://a/1",
            "https://a/2",
            "--config",
            "/tmp/c.toml",
        ]);
        assert_eq!(args.config.as_deref(), Some("/tmp/c.toml"));
        match args.command {
            Some(Commands::Download {
                urls,
                format,
                output,
                presets,
                ..
            }) => {
                assert_eq!(urls, vec!["https://a/1", "https://a/2"]);
                assert_eq!(format.as_deref(), Some("worst"));
                assert!(output.is_none());
                assert_eq!(presets, vec!["audio_extract_mp3", "merger"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_download_requires_urls() {
        assert!(Args::try_parse_from(["media-catcher", "download"]).is_err());
    }

    #[test]
    fn test_preset_postprocessors() {
        let pps = preset_postprocessors(&["merger".to_string()]).unwrap();
        assert_eq!(pps[0].key(), "FFmpegMerger");
        assert!(preset_postprocessors(&["nope".to_string()]).is_err());
        assert!(preset_postprocessors(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_quality_flags_build_format() {
        let args = Args::parse_from([
            "media-catcher",
            "download",
            "--video-height",
            "720",
            "--audio-bitrate",
            "128",
            "https://a/1",
        ]);
        match args.command {
            Some(Commands::Download {
                format,
                video_height,
                audio_bitrate,
                ..
            }) => assert_eq!(
                resolve_format(format, video_height, audio_bitrate).as_deref(),
                Some("bestvideo[height=720]+bestaudio[abr=128]/best")
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quality_flags_need_each_other_and_exclude_format() {
        assert!(Args::try_parse_from([
            "media-catcher",
            "download",
            "--video-height",
            "720",
            "https://a/1",
        ])
        .is_err());
        assert!(Args::try_parse_from([
            "media-catcher",
            "download",
            "-f",
            "best",
            "--video-height",
            "720",
            "--audio-bitrate",
            "128",
            "https://a/1",
        ])
        .is_err());
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(resolve_format(None, None, None), None);
        assert_eq!(
            resolve_format(Some("worst".to_string()), None, None).as_deref(),
            Some("worst")
        );
    }

    #[test]
    fn test_env_config_path_beats_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_config_path(
            None,
            Some("/etc/from-env.toml".to_string()),
            Some(dir.path().display().to_string()),
            Some(dir.path().to_path_buf()),
        );
        assert_eq!(path.as_deref(), Some("/etc/from-env.toml"));
    }

    #[test]
    fn test_xdg_config_path_used_when_present() {
        let xdg = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let xdg_home = xdg.path().display().to_string();

        // Missing file: falls through, and home has no config either.
        assert_eq!(
            resolve_config_path(None, None, Some(xdg_home.clone()), Some(home.path().to_path_buf())),
            None
        );

        std::fs::create_dir_all(xdg.path().join("media-catcher")).unwrap();
        std::fs::write(xdg.path().join("media-catcher/config.toml"), "").unwrap();
        assert_eq!(
            resolve_config_path(None, None, Some(xdg_home.clone()), Some(home.path().to_path_buf())),
            Some(format!("{}/media-catcher/config.toml", xdg_home))
        );
    }

    #[test]
    fn test_home_config_path_fallback() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".config/media-catcher")).unwrap();
        std::fs::write(home.path().join(".config/media-catcher/config.toml"), "").unwrap();

        assert_eq!(
            resolve_config_path(None, None, None, Some(home.path().to_path_buf())),
            Some(format!(
                "{}/.config/media-catcher/config.toml",
                home.path().display()
            ))
        );
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args = Args::parse_from(["media-catcher", "--config", "/etc/mc.toml", "check"]);
        assert_eq!(get_config_path(&args).as_deref(), Some("/etc/mc.toml"));
    }
}
