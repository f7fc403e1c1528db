//! Analysis intents — the fixed prompt templates plus the free-form custom query.

use serde::Serialize;

use crate::analysis::prompts::{
    COMPUTE_MATCH_PERCENTAGE_PROMPT, FIND_MISSING_KEYWORDS_PROMPT, SUGGEST_IMPROVEMENTS_PROMPT,
    SUMMARIZE_FIT_PROMPT,
};
use crate::errors::AppError;

/// Exactly one intent is active per analysis trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisIntent {
    SummarizeFit,
    SuggestImprovements,
    FindMissingKeywords,
    ComputeMatchPercentage,
    /// The user's own prompt, used verbatim as the template.
    CustomQuery(String),
}

/// Public description of an intent, as listed by `GET /api/v1/intents`.
#[derive(Debug, Clone, Serialize)]
pub struct IntentInfo {
    pub name: &'static str,
    pub label: &'static str,
    /// `None` for the custom query, whose template comes from the user.
    pub template: Option<&'static str>,
}

impl AnalysisIntent {
    pub const FIXED: [AnalysisIntent; 4] = [
        AnalysisIntent::SummarizeFit,
        AnalysisIntent::SuggestImprovements,
        AnalysisIntent::FindMissingKeywords,
        AnalysisIntent::ComputeMatchPercentage,
    ];

    /// Resolves the wire name sent by the client. `custom_prompt` is only
    /// consulted for `custom_query` and must be non-blank there.
    pub fn parse(name: &str, custom_prompt: Option<&str>) -> Result<Self, AppError> {
        match name.trim() {
            "summarize_fit" => Ok(AnalysisIntent::SummarizeFit),
            "suggest_improvements" => Ok(AnalysisIntent::SuggestImprovements),
            "find_missing_keywords" => Ok(AnalysisIntent::FindMissingKeywords),
            "compute_match_percentage" => Ok(AnalysisIntent::ComputeMatchPercentage),
            "custom_query" => match custom_prompt.map(str::trim) {
                Some(prompt) if !prompt.is_empty() => {
                    Ok(AnalysisIntent::CustomQuery(prompt.to_string()))
                }
                _ => Err(AppError::Validation(
                    "Please enter a custom query before asking it".to_string(),
                )),
            },
            "" => Err(AppError::Validation(
                "Please choose an analysis option".to_string(),
            )),
            other => Err(AppError::Validation(format!(
                "Unknown analysis option '{other}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisIntent::SummarizeFit => "summarize_fit",
            AnalysisIntent::SuggestImprovements => "suggest_improvements",
            AnalysisIntent::FindMissingKeywords => "find_missing_keywords",
            AnalysisIntent::ComputeMatchPercentage => "compute_match_percentage",
            AnalysisIntent::CustomQuery(_) => "custom_query",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisIntent::SummarizeFit => "Tell Me About the Resume",
            AnalysisIntent::SuggestImprovements => "How Can I Improve My Skills",
            AnalysisIntent::FindMissingKeywords => "What Keywords Are Missing",
            AnalysisIntent::ComputeMatchPercentage => "Percentage Match",
            AnalysisIntent::CustomQuery(_) => "Answer My Query",
        }
    }

    /// The instruction text sent ahead of the two documents.
    pub fn template(&self) -> &str {
        match self {
            AnalysisIntent::CustomQuery(prompt) => prompt,
            _ => self.fixed_template(),
        }
    }

    /// Only the missing-keywords action renders the resume keyword chart.
    pub fn shows_keyword_chart(&self) -> bool {
        matches!(self, AnalysisIntent::FindMissingKeywords)
    }

    pub fn info(&self) -> IntentInfo {
        IntentInfo {
            name: self.name(),
            label: self.label(),
            template: match self {
                AnalysisIntent::CustomQuery(_) => None,
                _ => Some(self.fixed_template()),
            },
        }
    }

    fn fixed_template(&self) -> &'static str {
        match self {
            AnalysisIntent::SummarizeFit => SUMMARIZE_FIT_PROMPT,
            AnalysisIntent::SuggestImprovements => SUGGEST_IMPROVEMENTS_PROMPT,
            AnalysisIntent::FindMissingKeywords => FIND_MISSING_KEYWORDS_PROMPT,
            AnalysisIntent::ComputeMatchPercentage => COMPUTE_MATCH_PERCENTAGE_PROMPT,
            AnalysisIntent::CustomQuery(_) => "",
        }
    }

    /// All intents in display order, custom query last.
    pub fn catalog() -> Vec<IntentInfo> {
        Self::FIXED
            .iter()
            .map(AnalysisIntent::info)
            .chain(std::iter::once(
                AnalysisIntent::CustomQuery(String::new()).info(),
            ))
            .collect()
    }
}
