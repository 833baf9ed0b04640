//! Line translation protocol
//!
//! A translation call takes a shared line, asks the backend for an English
//! rendering of its text and applies the result:
//!
//! ```text
//! in-flight guard ─▶ credential ─▶ POST generateContent ─▶ liveness check
//!                                                              │
//!        scroll ◀── store write-back ◀── newline fix ◀── apply + unblur timer
//! ```
//!
//! Any failure before the apply step leaves the line untouched and is logged
//! with the line's id. The liveness token belongs to the line component; once
//! it is cancelled neither the response nor a pending unblur timer touches
//! the line again.

mod client;
mod error;

#[cfg(test)]
pub(crate) mod stub;

use client::GeminiClient;
pub use error::TranslateError;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::TranslationConfig;
use crate::document::{SharedDocument, SharedLine};
use crate::scroll::ScrollRequest;

/// Credential baked in at build time, used when configuration has none
const BUILD_TIME_API_KEY: Option<&str> = option_env!("LINECAST_DEFAULT_API_KEY");

/// Per-line flag marking a pending translation
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the line; `None` if another translation holds it
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(&self.0)))
    }
}

/// Releases the in-flight flag when the translation call ends
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Everything one translation call needs from the line component
pub struct TranslateJob {
    pub line: SharedLine,
    pub document: SharedDocument,
    /// Initial obscured state of the new translation
    pub blur: bool,
    pub liveness: CancellationToken,
    pub in_flight: InFlight,
    /// Set when the line was flagged last at request time
    pub scroll: Option<ScrollRequest>,
}

/// Runs translation jobs against the configured backend
pub struct Translator {
    client: GeminiClient,
    api_key: Option<String>,
    unblur_after: Duration,
}

impl Translator {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslateError> {
        Self::build(config, BUILD_TIME_API_KEY)
    }

    pub(crate) fn build(
        config: &TranslationConfig,
        fallback_key: Option<&str>,
    ) -> Result<Self, TranslateError> {
        let client = GeminiClient::new(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?;

        let api_key = config.api_key.clone().or_else(|| {
            fallback_key
                .filter(|k| !k.trim().is_empty())
                .map(str::to_string)
        });

        Ok(Self {
            client,
            api_key,
            unblur_after: Duration::from_secs(config.unblur_after_secs),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate one line, logging any failure against the line's id
    pub async fn translate(&self, job: TranslateJob) -> Result<(), TranslateError> {
        let line_id = job.line.lock().id.clone();

        let result = self.run(job).await;
        match &result {
            Ok(()) => tracing::debug!(line = %line_id, "Translation applied"),
            Err(e) if e.is_benign() => {
                tracing::debug!(line = %line_id, "Translation skipped: {}", e)
            }
            Err(e) => tracing::error!(line = %line_id, "Translation failed: {}", e),
        }
        result
    }

    async fn run(&self, job: TranslateJob) -> Result<(), TranslateError> {
        let _guard = job.in_flight.try_acquire().ok_or(TranslateError::InFlight)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TranslateError::MissingCredential)?;

        let source = job.line.lock().text.clone();

        let translation = tokio::select! {
            _ = job.liveness.cancelled() => return Err(TranslateError::Cancelled),
            result = self.client.generate(api_key, &source) => result?,
        };
        if job.liveness.is_cancelled() {
            return Err(TranslateError::Cancelled);
        }

        let (index, blurred) = {
            let mut line = job.line.lock();
            line.translation = Some(translation);
            line.blur_translation = job.blur;
            if !line.text.ends_with(&['\n', '\r'][..]) {
                line.text.push('\n');
            }
            (line.index, line.blur_translation)
        };

        if blurred && !self.unblur_after.is_zero() {
            schedule_unblur(
                Arc::clone(&job.line),
                self.unblur_after,
                job.liveness.clone(),
            );
        }

        if !job.document.lock().replace_at(index, Arc::clone(&job.line)) {
            tracing::warn!(index, "Translated line has no slot in the document");
        }

        if let Some(scroll) = &job.scroll {
            scroll.fire();
        }

        Ok(())
    }
}

/// Reveal an obscured translation after `after`, unless `liveness` is cancelled first
pub fn schedule_unblur(
    line: SharedLine,
    after: Duration,
    liveness: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = liveness.cancelled() => {}
            _ = tokio::time::sleep(after) => {
                line.lock().blur_translation = false;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::stub::{stub_backend, HELLO};
    use super::*;
    use crate::document::{Document, LineItem};
    use crate::scroll::{ScrollCoordinator, ScrollOptions};
    use axum::http::StatusCode;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn translator(base_url: &str, api_key: Option<&str>, unblur_after_secs: u64) -> Translator {
        let config = TranslationConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            unblur_after_secs,
            timeout_secs: 5,
            ..TranslationConfig::default()
        };
        Translator::build(&config, None).unwrap()
    }

    /// A document of two lines plus a line object for slot 1 that the store
    /// does not hold yet
    fn fixture(text: &str) -> (SharedDocument, SharedLine) {
        let mut doc = Document::new();
        doc.push_text("前の行");
        doc.push_text("placeholder");
        let line = Arc::new(Mutex::new(LineItem::new("greeting", 1, text)));
        (doc.into_shared(), line)
    }

    fn job(document: &SharedDocument, line: &SharedLine, blur: bool) -> TranslateJob {
        TranslateJob {
            line: Arc::clone(line),
            document: Arc::clone(document),
            blur,
            liveness: CancellationToken::new(),
            in_flight: InFlight::default(),
            scroll: None,
        }
    }

    #[derive(Default)]
    struct CountingScroll(AtomicUsize);

    impl ScrollCoordinator for CountingScroll {
        fn scroll_to_newest(&self, _options: ScrollOptions) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_translate_applies_result_and_writes_back() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");

        translator.translate(job(&doc, &line, false)).await.unwrap();

        let item = line.lock().clone();
        assert_eq!(item.translation.as_deref(), Some("Hello"));
        assert_eq!(item.text, "こんにちは\n");
        assert!(!item.blur_translation);
        assert!(Arc::ptr_eq(&doc.lock().get(1).unwrap(), &line));
        assert_eq!(backend.hits(), 1);
        assert_eq!(backend.last_key.lock().as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_translate_keeps_existing_terminator() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは\n");

        translator.translate(job(&doc, &line, true)).await.unwrap();

        let item = line.lock().clone();
        assert_eq!(item.text, "こんにちは\n");
        assert!(item.blur_translation);
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, None, 0);
        let (doc, line) = fixture("こんにちは");

        let result = translator.translate(job(&doc, &line, false)).await;

        assert!(matches!(result, Err(TranslateError::MissingCredential)));
        assert_eq!(line.lock().translation, None);
        assert_eq!(backend.hits(), 0);
        assert!(!translator.has_credential());
    }

    #[tokio::test]
    async fn test_build_time_key_is_fallback() {
        let config = TranslationConfig::default();
        assert!(Translator::build(&config, Some("baked")).unwrap().has_credential());
        assert!(!Translator::build(&config, Some(" ")).unwrap().has_credential());
    }

    #[tokio::test]
    async fn test_server_error_leaves_line_unmodified() {
        let backend = stub_backend(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");
        let before = line.lock().clone();
        let scroll = Arc::new(CountingScroll::default());

        let mut job = job(&doc, &line, false);
        job.scroll = Some(ScrollRequest {
            coordinator: scroll.clone(),
            options: ScrollOptions::from_display(&Default::default()),
        });
        let result = translator.translate(job).await;

        match result {
            Err(TranslateError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(*line.lock(), before);
        assert!(!Arc::ptr_eq(&doc.lock().get(1).unwrap(), &line));
        assert_eq!(scroll.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported_not_panicking() {
        let backend = stub_backend(StatusCode::OK, r#"{"candidates":[]}"#).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");
        let before = line.lock().clone();

        let result = translator.translate(job(&doc, &line, false)).await;

        assert!(matches!(result, Err(TranslateError::Malformed(_))));
        assert_eq!(*line.lock(), before);
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_rejected() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");

        let job = job(&doc, &line, false);
        let _held = job.in_flight.try_acquire().unwrap();
        let result = translator.translate(job).await;

        assert!(matches!(result, Err(TranslateError::InFlight)));
        assert_eq!(backend.hits(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_released_after_call() {
        let backend = stub_backend(StatusCode::INTERNAL_SERVER_ERROR, "").await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");

        let job = job(&doc, &line, false);
        let in_flight = job.in_flight.clone();
        let _ = translator.translate(job).await;

        assert!(!in_flight.is_active());
        assert!(in_flight.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_line_is_not_touched() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");
        let before = line.lock().clone();

        let job = job(&doc, &line, false);
        job.liveness.cancel();
        let result = translator.translate(job).await;

        assert!(matches!(result, Err(TranslateError::Cancelled)));
        assert_eq!(*line.lock(), before);
    }

    #[tokio::test]
    async fn test_success_fires_scroll_request() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");
        let scroll = Arc::new(CountingScroll::default());

        let mut job = job(&doc, &line, false);
        job.scroll = Some(ScrollRequest {
            coordinator: scroll.clone(),
            options: ScrollOptions::from_display(&Default::default()),
        });
        translator.translate(job).await.unwrap();

        assert_eq!(scroll.0.load(Ordering::SeqCst), 1);
    }

    /// Long enough for a one-second unblur timer to have fired
    const PAST_UNBLUR: Duration = Duration::from_millis(1300);

    #[tokio::test]
    async fn test_blurred_translation_unblurs_after_configured_delay() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 1);
        let (doc, line) = fixture("こんにちは");

        translator.translate(job(&doc, &line, true)).await.unwrap();
        assert!(line.lock().blur_translation);

        tokio::time::sleep(PAST_UNBLUR).await;
        assert!(!line.lock().blur_translation);
    }

    #[tokio::test]
    async fn test_unblurred_translation_starts_no_timer() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 1);
        let (doc, line) = fixture("こんにちは");

        translator.translate(job(&doc, &line, false)).await.unwrap();
        // obscure it by hand; only a timer would clear this again
        line.lock().blur_translation = true;

        tokio::time::sleep(PAST_UNBLUR).await;
        assert!(line.lock().blur_translation);
    }

    #[tokio::test]
    async fn test_zero_unblur_delay_keeps_translation_blurred() {
        let backend = stub_backend(StatusCode::OK, HELLO).await;
        let translator = translator(&backend.base_url, Some("secret"), 0);
        let (doc, line) = fixture("こんにちは");

        translator.translate(job(&doc, &line, true)).await.unwrap();

        tokio::time::sleep(PAST_UNBLUR).await;
        assert!(line.lock().blur_translation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unblur_timer_reveals_after_delay() {
        let line = Arc::new(Mutex::new(LineItem::new("a", 0, "text")));
        line.lock().blur_translation = true;

        let handle = schedule_unblur(
            Arc::clone(&line),
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;
        assert!(line.lock().blur_translation);

        tokio::time::advance(Duration::from_secs(1)).await;
        handle.await.unwrap();
        assert!(!line.lock().blur_translation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unblur_timer_respects_liveness() {
        let line = Arc::new(Mutex::new(LineItem::new("a", 0, "text")));
        line.lock().blur_translation = true;
        let liveness = CancellationToken::new();

        let handle = schedule_unblur(Arc::clone(&line), Duration::from_secs(5), liveness.clone());
        tokio::task::yield_now().await;
        liveness.cancel();
        tokio::time::advance(Duration::from_secs(10)).await;
        handle.await.unwrap();

        assert!(line.lock().blur_translation);
    }
}
