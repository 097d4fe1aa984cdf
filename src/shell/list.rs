use super::{write_line, write_prompt};
use crate::media::{DownloadError, MediaDownloader, UrlQueue};
use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, Lines},
    sync::mpsc,
};
use tracing::{debug, info, warn};
use url::Url;

const HELP: &str = "\
Commands:
  add <url>     probe a URL and add it to the list (a bare URL works too)
  remove <n>    remove entry n
  list          show the list
  clean         remove every entry
  download      download every entry in the background
  settings      show the active download settings
  help          show this help
  quit          leave (waits for a running download)";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add(String),
    Remove(String),
    List,
    Clean,
    Download,
    Settings,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Blank lines parse to `None`.
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => Self::Add(rest.to_string()),
            "remove" | "rm" => Self::Remove(rest.to_string()),
            "list" | "ls" => Self::List,
            "clean" | "clear" => Self::Clean,
            "download" | "dl" => Self::Download,
            "settings" => Self::Settings,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ if Url::parse(line).is_ok() => Self::Add(line.to_string()),
            _ => Self::Unknown(word.to_string()),
        };
        Some(command)
    }
}

/// Interactive URL list: entries are probed as they are added and the whole
/// list is downloaded on a worker task while the prompt stays usable.
pub struct ListShell<R, W> {
    lines: Lines<R>,
    output: W,
    downloader: MediaDownloader,
    queue: UrlQueue,
    labels: Vec<String>,
    /// URLs submitted with the batch currently in flight.
    pending: Option<Vec<String>>,
    done_tx: mpsc::UnboundedSender<Result<(), DownloadError>>,
    done_rx: mpsc::UnboundedReceiver<Result<(), DownloadError>>,
}

enum Event {
    Line(std::io::Result<Option<String>>),
    Done(Result<(), DownloadError>),
}

impl<R, W> ListShell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, downloader: MediaDownloader) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            lines: input.lines(),
            output,
            downloader,
            queue: UrlQueue::new(),
            labels: Vec::new(),
            pending: None,
            done_tx,
            done_rx,
        }
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        write_line(&mut self.output, text).await
    }

    async fn add(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(());
        }

        match self.downloader.fetcher.probe(url).await {
            Ok(media) => {
                let label = media.to_string();
                debug!("Adding {} as '{}'", url, label);
                self.queue.append(url);
                self.labels.push(label.clone());
                let line = format!("{}. {}", self.queue.len(), label);
                self.say(&line).await
            }
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn remove(&mut self, arg: &str) -> Result<()> {
        let removed = arg
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| {
                let url = self.queue.remove(index)?;
                Some((url, self.labels.remove(index)))
            });

        match removed {
            Some((url, _)) => self.say(&format!("Removed {}", url)).await,
            None => self.say(&format!("No entry '{}'", arg)).await,
        }
    }

    async fn list(&mut self) -> Result<()> {
        if self.labels.is_empty() {
            return self.say("(empty)").await;
        }
        let listing = self
            .labels
            .iter()
            .zip(self.queue.all())
            .enumerate()
            .map(|(i, (label, url))| format!("{}. {}  <{}>", i + 1, label, url))
            .collect::<Vec<_>>()
            .join("\n");
        self.say(&listing).await
    }

    async fn clean(&mut self) -> Result<()> {
        self.queue.clear();
        self.labels.clear();
        self.say("List cleared").await
    }

    async fn start_download(&mut self) -> Result<()> {
        if self.pending.is_some() || self.downloader.orchestrator.is_busy() {
            return self.say("A download is already in progress").await;
        }
        if self.queue.is_empty() {
            return self.say("Nothing to download").await;
        }

        let urls = self.queue.all().to_vec();
        let settings = self.downloader.settings.current();
        let orchestrator = self.downloader.orchestrator.clone();
        let done_tx = self.done_tx.clone();

        info!("Starting background download of {} URL(s)", urls.len());
        self.pending = Some(urls.clone());

        tokio::spawn(async move {
            let result = orchestrator.download(&urls, &settings).await;
            // The shell is gone if the receiver was dropped; nothing to report to.
            let _ = done_tx.send(result);
        });

        let line = format!("Downloading {} URL(s)...", self.queue.len());
        self.say(&line).await
    }

    async fn finish_download(&mut self, result: Result<(), DownloadError>) -> Result<()> {
        let submitted = self.pending.take().unwrap_or_default();

        match result {
            Ok(()) => {
                // Entries added while the batch ran stay in the list.
                for url in &submitted {
                    if let Some(index) = self.queue.all().iter().position(|u| u == url) {
                        self.queue.remove(index);
                        self.labels.remove(index);
                    }
                }
                self.say("Media downloaded successfully").await
            }
            Err(e) => {
                warn!("Background download failed: {}", e);
                self.say(&format!("Error: {}", e)).await
            }
        }
    }

    async fn wait_for_pending(&mut self) -> Result<()> {
        if self.pending.is_none() {
            return Ok(());
        }
        self.say("Waiting for the current download to finish...")
            .await?;
        if let Some(result) = self.done_rx.recv().await {
            self.finish_download(result).await?;
        }
        Ok(())
    }

    /// Returns `false` when the shell should stop.
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Add(url) => self.add(&url).await?,
            Command::Remove(arg) => self.remove(&arg).await?,
            Command::List => self.list().await?,
            Command::Clean => self.clean().await?,
            Command::Download => self.start_download().await?,
            Command::Settings => {
                let text = format!(
                    "Settings cannot be edited here yet. Active settings:\n{}",
                    self.downloader.settings.current()
                );
                self.say(&text).await?;
            }
            Command::Help => self.say(HELP).await?,
            Command::Quit => return Ok(false),
            Command::Unknown(word) => {
                self.say(&format!("Unknown command '{}', type 'help'", word))
                    .await?
            }
        }
        Ok(true)
    }

    pub async fn run(&mut self) -> Result<()> {
        self.say("Media Catcher - type 'help' for commands").await?;

        loop {
            write_prompt(&mut self.output, "> ").await?;

            let event = tokio::select! {
                line = self.lines.next_line() => Event::Line(line),
                Some(result) = self.done_rx.recv(), if self.pending.is_some() => Event::Done(result),
            };

            match event {
                Event::Done(result) => self.finish_download(result).await?,
                Event::Line(line) => {
                    let Some(line) = line.context("Failed to read from terminal")? else {
                        break;
                    };
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    if !self.handle(command).await? {
                        break;
                    }
                }
            }
        }

        self.wait_for_pending().await
    }
}
