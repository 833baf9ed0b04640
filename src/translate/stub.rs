//! In-process translation backend for tests

use axum::http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A successful response translating to "Hello"
pub const HELLO: &str =
    r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}"#;

pub struct StubBackend {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
    pub last_key: Arc<Mutex<Option<String>>>,
}

impl StubBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve `status` and `body` for every request on an ephemeral port
pub async fn stub_backend(status: StatusCode, body: &'static str) -> StubBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_key = Arc::new(Mutex::new(None));

    let counter = Arc::clone(&hits);
    let key_slot = Arc::clone(&last_key);
    let app = axum::Router::new().fallback(move |headers: HeaderMap| {
        let counter = Arc::clone(&counter);
        let key_slot = Arc::clone(&key_slot);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            *key_slot.lock() = headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            (status, body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubBackend {
        base_url: format!("http://{}", addr),
        hits,
        last_key,
    }
}
