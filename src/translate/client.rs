//! Generative-content client used for line translation

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::TranslateError;

/// Instruction prepended to every source text
pub const INSTRUCTION: &str = "Translate the following Japanese text into natural English. \
Reply with the English translation only, without notes or romanization.\n\n";

/// Longest error body kept for the log
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

impl GenerateRequest {
    fn for_source(source: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: format!("{}{}", INSTRUCTION, source),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for `POST {base_url}/models/{model}:generateContent`
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TranslateError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        })
    }

    /// Send one translation request and return the first candidate's text
    pub async fn generate(&self, api_key: &str, source: &str) -> Result<String, TranslateError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest::for_source(source))
            .send()
            .await
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        extract_translation(&body)
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
fn extract_translation(body: &str) -> Result<String, TranslateError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TranslateError::Malformed(e.to_string()))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| TranslateError::Malformed("no candidates".to_string()))?
        .content
        .ok_or_else(|| TranslateError::Malformed("candidate has no content".to_string()))?
        .parts
        .into_iter()
        .next()
        .and_then(|part| part.text)
        .ok_or_else(|| TranslateError::Malformed("candidate has no text part".to_string()))?;

    if text.trim().is_empty() {
        return Err(TranslateError::Malformed("empty translation".to_string()));
    }
    Ok(text)
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest::for_source("こんにちは")).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with(INSTRUCTION));
        assert!(text.ends_with("こんにちは"));
    }

    #[test]
    fn test_extract_first_candidate() {
        let body = r#"{"candidates": [
            {"content": {"parts": [{"text": "Hello\n"}, {"text": "ignored"}], "role": "model"}},
            {"content": {"parts": [{"text": "Second"}]}}
        ]}"#;
        assert_eq!(extract_translation(body).unwrap(), "Hello\n");
    }

    #[test]
    fn test_extract_malformed_shapes() {
        for body in [
            "not json",
            r#"{}"#,
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#,
        ] {
            assert!(
                matches!(extract_translation(body), Err(TranslateError::Malformed(_))),
                "expected malformed for {body}"
            );
        }
    }

    #[test]
    fn test_truncate_respects_utf8() {
        let mut s = "あいう".to_string(); // 3 bytes per char
        truncate_at_char_boundary(&mut s, 4);
        assert_eq!(s, "あ");
    }
}
