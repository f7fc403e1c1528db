//! Analysis Request Dispatcher — sends (prompt, resume, JD) to the model, memoized
//! per session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analysis::cache::{cache_key, CacheStatus, ResponseCache};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

/// Immutable request triple. Both documents must contain non-blank text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    prompt: String,
    candidate_text: String,
    job_description: String,
}

impl AnalysisRequest {
    pub fn new(
        prompt: impl Into<String>,
        candidate_text: impl Into<String>,
        job_description: impl Into<String>,
    ) -> Result<Self, AppError> {
        let request = Self {
            prompt: prompt.into(),
            candidate_text: candidate_text.into(),
            job_description: job_description.into(),
        };
        if request.prompt.trim().is_empty() {
            return Err(AppError::Validation("The analysis prompt is empty".into()));
        }
        if request.candidate_text.trim().is_empty() {
            return Err(AppError::Validation(
                "No text could be read from the resume".into(),
            ));
        }
        if request.job_description.trim().is_empty() {
            return Err(AppError::Validation("The job description is empty".into()));
        }
        Ok(request)
    }

    pub fn candidate_text(&self) -> &str {
        &self.candidate_text
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Content parts in the order the model receives them.
    fn parts(&self) -> [&str; 3] {
        [
            self.prompt.as_str(),
            self.candidate_text.as_str(),
            self.job_description.as_str(),
        ]
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.parts())
    }
}

/// Calls the text generator, consulting the caller's cache first.
#[derive(Clone)]
pub struct AnalysisDispatcher {
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisDispatcher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Returns the cached response for an identical request, otherwise makes
    /// exactly one model call. Only successful responses are cached.
    pub async fn dispatch(
        &self,
        cache: &ResponseCache,
        request: &AnalysisRequest,
    ) -> Result<String, AppError> {
        let key = request.cache_key();

        match cache.lookup(&key) {
            CacheStatus::Hit(response) => {
                debug!("Analysis cache hit ({})", &key[..12]);
                return Ok(response);
            }
            CacheStatus::PreviouslyFailed(reason) => {
                info!("Retrying request that previously failed ({}): {reason}", &key[..12]);
            }
            CacheStatus::Miss => debug!("Analysis cache miss ({})", &key[..12]),
        }

        match self.generator.generate(&request.parts()).await {
            Ok(response) => {
                cache.store_success(key, response.clone());
                debug!("Session cache now holds {} entries", cache.entry_count());
                Ok(response)
            }
            Err(e) => {
                warn!("Analysis call failed: {e}");
                cache.record_failure(key, e.to_string());
                Err(AppError::ExternalService(e.to_string()))
            }
        }
    }
}
