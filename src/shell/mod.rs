pub mod console;
pub mod list;

use anyhow::{Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub use console::ConsoleShell;
pub use list::ListShell;

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{}\n", text).as_bytes())
        .await
        .context("Failed to write to terminal")?;
    output.flush().await.context("Failed to flush terminal")
}

/// Writes `text` without a newline so the answer lands on the same line.
async fn write_prompt<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Failed to write to terminal")?;
    output.flush().await.context("Failed to flush terminal")
}
