//! Uploaded documents and their extracted text.

pub mod extractor;

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::documents::extractor::{ensure_pdf, DocumentExtractor, ExtractError};
use crate::errors::AppError;

/// One uploaded file. Text is extracted on first use and cached for the lifetime
/// of the upload.
#[derive(Debug)]
pub struct Document {
    pub file_name: Option<String>,
    pub media_type: Option<String>,
    bytes: Bytes,
    text: OnceCell<String>,
}

impl Document {
    pub fn new(bytes: Bytes, file_name: Option<String>, media_type: Option<String>) -> Self {
        Self {
            file_name,
            media_type,
            bytes,
            text: OnceCell::new(),
        }
    }

    /// Label used in logs and batch results.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<unnamed>")
    }

    /// Returns the plain text of this document, parsing it at most once.
    ///
    /// Parsing runs on the blocking pool. A panic inside the parser is reported
    /// as an extraction failure for this document only.
    pub async fn text(&self, extractor: &Arc<dyn DocumentExtractor>) -> Result<&str, AppError> {
        let text = self
            .text
            .get_or_try_init(|| async {
                ensure_pdf(self.media_type.as_deref(), self.file_name.as_deref())
                    .map_err(|e| extraction_error(self.display_name(), e))?;

                let extractor = Arc::clone(extractor);
                let bytes = self.bytes.clone();
                let extracted = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
                    .await
                    .map_err(|e| {
                        extraction_error(
                            self.display_name(),
                            ExtractError::Malformed(format!("parser aborted: {e}")),
                        )
                    })?
                    .map_err(|e| extraction_error(self.display_name(), e))?;

                debug!(
                    "Extracted {} chars from '{}' ({} bytes)",
                    extracted.len(),
                    self.display_name(),
                    self.bytes.len()
                );
                Ok::<_, AppError>(extracted)
            })
            .await?;
        Ok(text.as_str())
    }
}

fn extraction_error(name: &str, e: ExtractError) -> AppError {
    AppError::Extraction(format!("'{name}': {e}"))
}
