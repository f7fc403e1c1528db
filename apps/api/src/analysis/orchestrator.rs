//! Session Orchestrator — validates inputs, drives the session state machine and
//! runs single or comparison analyses.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::dispatcher::{AnalysisDispatcher, AnalysisRequest};
use crate::analysis::intent::AnalysisIntent;
use crate::analysis::keywords::{summarize, KeywordChart};
use crate::analysis::prompts::SUMMARIZE_FIT_PROMPT;
use crate::analysis::report::{comparison_report, single_report, Report};
use crate::analysis::session::Session;
use crate::documents::extractor::DocumentExtractor;
use crate::documents::Document;
use crate::errors::AppError;

/// Most resumes accepted by one comparison.
pub const MAX_RESUMES: usize = 10;

/// Job description as typed and/or uploaded. An upload takes precedence.
#[derive(Debug, Default)]
pub struct JobDescriptionInput {
    pub typed: Option<String>,
    pub upload: Option<Document>,
}

impl JobDescriptionInput {
    fn is_present(&self) -> bool {
        self.upload.is_some() || self.typed.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    async fn resolve(&self, extractor: &Arc<dyn DocumentExtractor>) -> Result<String, AppError> {
        match (&self.upload, &self.typed) {
            (Some(upload), _) => {
                let text = upload.text(extractor).await?;
                if text.trim().is_empty() {
                    return Err(AppError::Validation(format!(
                        "No text could be read from the job description '{}'",
                        upload.display_name()
                    )));
                }
                Ok(text.to_string())
            }
            (None, Some(typed)) if !typed.trim().is_empty() => Ok(typed.clone()),
            _ => Err(missing_job_description()),
        }
    }
}

#[derive(Debug, Default)]
pub struct SingleInputs {
    pub job_description: JobDescriptionInput,
    pub resume: Option<Document>,
    pub intent: Option<String>,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Default)]
pub struct CompareInputs {
    pub job_description: JobDescriptionInput,
    pub resumes: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct SingleOutcome {
    pub intent: &'static str,
    pub response: String,
    pub report: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordChart>,
}

#[derive(Debug, Serialize)]
pub struct ItemError {
    pub code: &'static str,
    pub message: String,
}

/// One block of a comparison. Exactly one of `response` / `error` is set.
#[derive(Debug, Serialize)]
pub struct ComparisonItem {
    pub index: usize,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonOutcome {
    pub results: Vec<ComparisonItem>,
}

#[derive(Clone)]
pub struct Orchestrator {
    dispatcher: AnalysisDispatcher,
    extractor: Arc<dyn DocumentExtractor>,
}

impl Orchestrator {
    pub fn new(dispatcher: AnalysisDispatcher, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self {
            dispatcher,
            extractor,
        }
    }

    /// Runs one intent against one resume.
    pub async fn run_single(
        &self,
        session: &Session,
        inputs: SingleInputs,
    ) -> Result<SingleOutcome, AppError> {
        session.ensure_not_busy()?;
        let (intent, resume) = match validate_single(&inputs) {
            Ok(valid) => valid,
            Err(e) => {
                session.mark_invalid();
                return Err(e);
            }
        };

        let guard = session.begin_dispatch()?;
        info!("Session {}: running {}", session.id, intent.name());

        match self
            .analyze_single(session, &intent, resume, &inputs.job_description)
            .await
        {
            Ok((outcome, report)) => {
                guard.finish(vec![report]);
                Ok(outcome)
            }
            Err(e) => {
                guard.fail(&e);
                Err(e)
            }
        }
    }

    async fn analyze_single(
        &self,
        session: &Session,
        intent: &AnalysisIntent,
        resume: &Document,
        job_description: &JobDescriptionInput,
    ) -> Result<(SingleOutcome, Report), AppError> {
        let job_description = job_description.resolve(&self.extractor).await?;
        let resume_text = resume.text(&self.extractor).await?;
        let request = AnalysisRequest::new(intent.template(), resume_text, job_description)?;
        let response = self.dispatcher.dispatch(session.cache(), &request).await?;

        let keywords = if intent.shows_keyword_chart() {
            KeywordChart::from_summary(summarize(request.candidate_text()))
        } else {
            None
        };

        let report = single_report(request.job_description(), request.candidate_text(), &response);
        let outcome = SingleOutcome {
            intent: intent.name(),
            response,
            report: report.file_name.clone(),
            keywords,
        };
        Ok((outcome, report))
    }

    /// Runs the fit summary once per resume, in upload order. Per-resume failures
    /// are reported inline and the batch continues.
    pub async fn run_comparison(
        &self,
        session: &Session,
        inputs: CompareInputs,
    ) -> Result<ComparisonOutcome, AppError> {
        session.ensure_not_busy()?;
        if let Err(e) = validate_comparison(&inputs) {
            session.mark_invalid();
            return Err(e);
        }

        let guard = session.begin_dispatch()?;
        info!(
            "Session {}: comparing {} resumes",
            session.id,
            inputs.resumes.len()
        );

        let job_description = match inputs.job_description.resolve(&self.extractor).await {
            Ok(text) => text,
            Err(e) => {
                guard.fail(&e);
                return Err(e);
            }
        };

        let mut results = Vec::with_capacity(inputs.resumes.len());
        let mut reports = Vec::new();

        for (i, resume) in inputs.resumes.iter().enumerate() {
            let index = i + 1;
            let file_name = resume.display_name().to_string();

            match self.compare_one(session, resume, &job_description).await {
                Ok((resume_text, response)) => {
                    let report =
                        comparison_report(index, &job_description, &resume_text, &response);
                    results.push(ComparisonItem {
                        index,
                        file_name,
                        response: Some(response),
                        error: None,
                        report: Some(report.file_name.clone()),
                    });
                    reports.push(report);
                }
                Err(e) => {
                    warn!("Session {}: resume {index} failed: {e}", session.id);
                    results.push(ComparisonItem {
                        index,
                        file_name,
                        response: None,
                        error: Some(ItemError {
                            code: e.code(),
                            message: e.user_message(),
                        }),
                        report: None,
                    });
                }
            }
        }

        guard.finish(reports);
        Ok(ComparisonOutcome { results })
    }

    async fn compare_one(
        &self,
        session: &Session,
        resume: &Document,
        job_description: &str,
    ) -> Result<(String, String), AppError> {
        let resume_text = resume.text(&self.extractor).await?;
        let request = AnalysisRequest::new(SUMMARIZE_FIT_PROMPT, resume_text, job_description)?;
        let response = self.dispatcher.dispatch(session.cache(), &request).await?;
        Ok((resume_text.to_string(), response))
    }
}

fn validate_single(inputs: &SingleInputs) -> Result<(AnalysisIntent, &Document), AppError> {
    if !inputs.job_description.is_present() {
        return Err(missing_job_description());
    }
    let resume = inputs.resume.as_ref().ok_or_else(missing_resume)?;
    let intent = AnalysisIntent::parse(
        inputs.intent.as_deref().unwrap_or_default(),
        inputs.custom_prompt.as_deref(),
    )?;
    Ok((intent, resume))
}

fn validate_comparison(inputs: &CompareInputs) -> Result<(), AppError> {
    if !inputs.job_description.is_present() {
        return Err(missing_job_description());
    }
    match inputs.resumes.len() {
        0 => Err(AppError::Validation(
            "Please upload at least one resume to compare".to_string(),
        )),
        n if n > MAX_RESUMES => Err(AppError::Validation(format!(
            "At most {MAX_RESUMES} resumes can be compared at once, got {n}"
        ))),
        _ => Ok(()),
    }
}

fn missing_job_description() -> AppError {
    AppError::Validation("Please provide a job description, typed or uploaded".to_string())
}

fn missing_resume() -> AppError {
    AppError::Validation("Please upload your resume".to_string())
}
