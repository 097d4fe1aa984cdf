use super::{write_line, write_prompt};
use crate::media::{MediaDownloader, UrlQueue};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, Lines};
use tracing::{info, warn};

const RULE: &str = "========================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Exit,
    Download,
}

impl MenuOption {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match input.parse::<u8>().ok()? {
            0 => Some(Self::Exit),
            1 => Some(Self::Download),
            _ => None,
        }
    }
}

/// Numbered-menu loop: collect URLs, download them, repeat until exit.
/// Downloads run in place, so the menu waits for each batch to finish.
pub struct ConsoleShell<R, W> {
    lines: Lines<R>,
    output: W,
    downloader: MediaDownloader,
    queue: UrlQueue,
}

impl<R, W> ConsoleShell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, downloader: MediaDownloader) -> Self {
        Self {
            lines: input.lines(),
            output,
            downloader,
            queue: UrlQueue::new(),
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write_prompt(&mut self.output, prompt).await?;
        self.lines
            .next_line()
            .await
            .context("Failed to read from terminal")
    }

    async fn print_menu(&mut self) -> Result<()> {
        let menu = format!(
            "\n{RULE}\n        MENU\n{RULE}\n    0) - Go out.\n    1) - Download Audio or Video.\n{RULE}"
        );
        write_line(&mut self.output, &menu).await
    }

    /// Returns `None` when input runs out.
    async fn choose(&mut self) -> Result<Option<MenuOption>> {
        self.print_menu().await?;
        loop {
            let Some(answer) = self.ask("Enter option: ").await? else {
                return Ok(None);
            };
            match MenuOption::parse(&answer) {
                Some(option) => return Ok(Some(option)),
                None => write_line(&mut self.output, "Invalid Option...").await?,
            }
        }
    }

    /// Collects URLs until the user declines to add another. Returns `false`
    /// when input ran out.
    async fn collect_urls(&mut self) -> Result<bool> {
        let mut urls = Vec::new();
        loop {
            let Some(url) = self.ask("Enter URL: ").await? else {
                return Ok(false);
            };
            urls.push(url.trim().to_string());

            let Some(again) = self.ask("Add another URL? (y/n): ").await? else {
                return Ok(false);
            };
            if !again.trim().eq_ignore_ascii_case("y") {
                break;
            }
        }
        self.queue.replace(urls);
        Ok(true)
    }

    async fn download(&mut self) -> Result<()> {
        info!("Console download of {} URL(s)", self.queue.len());
        match self.downloader.download_queue(&mut self.queue).await {
            Ok(()) => write_line(&mut self.output, "Media downloaded successfully").await,
            Err(e) => {
                warn!("Console download failed: {}", e);
                write_line(&mut self.output, &format!("Error: {}", e)).await
            }
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.choose().await? {
                Some(MenuOption::Exit) => {
                    write_line(&mut self.output, "Done!").await?;
                    return Ok(());
                }
                Some(MenuOption::Download) => {
                    if !self.collect_urls().await? {
                        return Ok(());
                    }
                    self.download().await?;
                }
                None => return Ok(()),
            }
        }
    }
}
