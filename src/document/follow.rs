//! Follow mode: watch a text document for appended lines
//!
//! The file is polled rather than watched; transcript sources append a line
//! every few seconds at most.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Send every complete line appended after `offset` bytes until cancelled
///
/// A trailing fragment without a newline is held back as raw bytes until it
/// is completed, so a character split across two polls survives. If the file
/// shrinks it is treated as rewritten and read from the start.
pub async fn follow_file(
    path: PathBuf,
    mut offset: u64,
    lines: mpsc::Sender<String>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    let mut pending: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = interval.tick() => {}
        }

        let len = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!("Cannot stat followed file {}: {}", path.display(), e);
                continue;
            }
        };

        if len < offset {
            tracing::info!("{} was truncated, reading from the start", path.display());
            offset = 0;
            pending.clear();
        }
        if len == offset {
            continue;
        }

        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        let read = file.read_to_end(&mut pending).await?;
        offset += read as u64;

        for line in drain_complete_lines(&mut pending) {
            if lines.send(line).await.is_err() {
                return Ok(()); // viewer is gone
            }
        }
    }
}

/// Remove and return all newline-terminated, non-blank lines from `buffer`
///
/// Only the bytes up to the last newline are decoded.
fn drain_complete_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let Some(last_newline) = buffer.iter().rposition(|&b| b == b'\n') else {
        return Vec::new();
    };
    let rest = buffer.split_off(last_newline + 1);
    let complete = std::mem::replace(buffer, rest);

    String::from_utf8_lossy(&complete)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}
