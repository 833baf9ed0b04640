// Headless mode - print the transcript instead of opening the viewer
//
// With automatic translation on, untranslated lines are translated one at a
// time before printing. Followed lines are handled the same way as they
// arrive, until the source stops or Ctrl-C.

use crate::config::Config;
use crate::document::{SharedDocument, SharedLine};
use crate::line::display_text;
use crate::translate::{InFlight, TranslateJob, Translator};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub async fn run(
    document: SharedDocument,
    config: &Config,
    translator: Arc<Translator>,
    follow: Option<mpsc::Receiver<String>>,
) -> Result<()> {
    let lines = document.lock().lines().to_vec();
    for line in lines {
        emit(&line, &document, config, &translator).await;
    }

    let Some(mut follow) = follow else {
        return Ok(());
    };
    loop {
        tokio::select! {
            text = follow.recv() => match text {
                Some(text) => {
                    let line = document.lock().push_text(text);
                    emit(&line, &document, config, &translator).await;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }
    Ok(())
}

async fn emit(
    line: &SharedLine,
    document: &SharedDocument,
    config: &Config,
    translator: &Translator,
) {
    let untranslated = line.lock().translation.is_none();
    if config.translation.auto_translate && untranslated {
        // failures are logged by the translator; the line still prints
        let _ = translator
            .translate(TranslateJob {
                line: Arc::clone(line),
                document: Arc::clone(document),
                blur: false,
                liveness: CancellationToken::new(),
                in_flight: InFlight::default(),
                scroll: None,
            })
            .await;
    }

    let line = line.lock();
    println!("{}", display_text(&line.text, config.display.preserve_whitespace));
    if let Some(translation) = &line.translation {
        println!("  → {}", translation.trim_end());
    }
}
