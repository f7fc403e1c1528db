//! In-memory fakes shared by unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::documents::extractor::{DocumentExtractor, ExtractError};
use crate::llm_client::{LlmError, TextGenerator};

/// Records every call and answers `response #<n>`. Fails when any part contains
/// `fail_marker`.
pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<String>>>,
    pub fail_marker: Option<String>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            fail_marker: None,
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, parts: &[&str]) -> Result<String, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen
            .lock()
            .unwrap()
            .push(parts.iter().map(|p| p.to_string()).collect());
        if let Some(marker) = &self.fail_marker {
            if parts.iter().any(|p| p.contains(marker.as_str())) {
                return Err(LlmError::Api {
                    status: 429,
                    message: "quota exceeded".into(),
                });
            }
        }
        Ok(format!("response #{n}"))
    }
}

/// Treats the uploaded bytes as UTF-8 text. Bytes starting with `%BROKEN` are
/// rejected as malformed.
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.starts_with(b"%BROKEN") {
            return Err(ExtractError::Malformed("no pages".into()));
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Malformed(e.to_string()))
    }
}
