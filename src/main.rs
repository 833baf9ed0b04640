// linecast - terminal transcript viewer
//
// Shows a transcript one line per entry and lets the user select, edit and
// translate lines with the mouse.
//
// Architecture:
// - Document: the ordered lines and milestone labels, shared by everything
// - Line: per-line state machine (selection, editing, hover, translate control)
// - Translate: Gemini client and the apply/write-back protocol
// - TUI (ratatui): hosts one line component per line and routes input
// - Follow: polls the source file and feeds appended lines to the viewer

mod cli;
mod config;
mod document;
mod headless;
mod line;
mod logging;
mod scroll;
mod translate;
mod tui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, VERSION};
use document::{follow_file, load_document, Document};
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    if cli::handle_command(&cli) {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    cli.apply(&mut config);

    let log_buffer = LogBuffer::new();
    // The guard must live until exit so buffered file logs are flushed
    let _file_guard = init_tracing(&config, &log_buffer);

    tracing::info!(version = VERSION, "linecast starting");

    let document = match &cli.file {
        Some(path) => load_document(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Document::new(),
    };
    tracing::info!(lines = document.len(), "Document loaded");
    let document = document.into_shared();

    let translator = Arc::new(
        translate::Translator::new(&config.translation)
            .context("Failed to create translation client")?,
    );
    if !translator.has_credential() {
        tracing::warn!("No API key configured; set GEMINI_API_KEY or [translation] api_key");
    }

    let cancel = CancellationToken::new();
    let follow = match (&cli.file, cli.follow) {
        (Some(path), true) => {
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
                bail!("--follow works on plain text transcripts only");
            }
            let offset = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let (tx, rx) = mpsc::channel(256);
            let path = path.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = follow_file(path, offset, tx, cancel).await {
                    tracing::error!("Follow stopped: {:#}", e);
                }
            });
            Some(rx)
        }
        (None, true) => bail!("--follow needs a FILE"),
        _ => None,
    };

    let result = if config.enable_tui {
        tui::run_tui(
            document,
            cli.file.clone(),
            config,
            translator,
            log_buffer,
            follow,
        )
        .await
    } else {
        headless::run(document, &config, translator, follow).await
    };

    cancel.cancel();
    result
}

/// Initialize tracing/logging with conditional output
///
/// In TUI mode logs are captured into `log_buffer` (writing to stdout would
/// garble the display); headless they go to stdout. File logging adds a
/// rotating JSON log on top of either.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_tracing(config: &Config, log_buffer: &LogBuffer) -> Option<WorkerGuard> {
    let default_filter = config.logging.filter_directive();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let screen = if config.enable_tui {
        TuiLogLayer::new(log_buffer.clone()).boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let mut guard = None;
    let file = if config.logging.file_enabled {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let appender = config
                    .logging
                    .file_rotation
                    .appender(&config.logging.file_dir, &config.logging.file_prefix);
                let (writer, file_guard) = tracing_appender::non_blocking(appender);
                guard = Some(file_guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(screen)
        .with(file)
        .init();

    guard
}
