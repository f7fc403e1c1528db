use std::sync::Arc;

use chrono::Duration;

use crate::analysis::dispatcher::AnalysisDispatcher;
use crate::analysis::orchestrator::Orchestrator;
use crate::analysis::session::SessionStore;
use crate::config::Config;
use crate::documents::extractor::DocumentExtractor;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    /// Built once from the text generator and document extractor; both are
    /// swappable so tests can run without Gemini or real PDFs.
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        let sessions = SessionStore::new(
            Duration::minutes(config.session_idle_minutes),
            config.max_sessions,
        );
        Self {
            config,
            sessions: Arc::new(sessions),
            orchestrator: Orchestrator::new(AnalysisDispatcher::new(generator), extractor),
        }
    }
}
