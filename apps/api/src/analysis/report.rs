//! Downloadable plain-text reports.

pub const SINGLE_REPORT_FILE: &str = "analysis_report.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub file_name: String,
    pub title: String,
    pub content: String,
}

/// Report for a single-resume analysis.
pub fn single_report(job_description: &str, resume_text: &str, response: &str) -> Report {
    build(
        SINGLE_REPORT_FILE.to_string(),
        "Resume Analysis Report".to_string(),
        job_description,
        resume_text,
        response,
    )
}

/// Report for resume `position` (1-indexed, upload order) of a comparison batch.
pub fn comparison_report(
    position: usize,
    job_description: &str,
    resume_text: &str,
    response: &str,
) -> Report {
    build(
        format!("comparison_report_resume_{position}.txt"),
        format!("Resume Comparison Report for Resume {position}"),
        job_description,
        resume_text,
        response,
    )
}

fn build(
    file_name: String,
    title: String,
    job_description: &str,
    resume_text: &str,
    response: &str,
) -> Report {
    let content = format!(
        "{title}\n\nJob Description:\n{job_description}\n\nResume Content:\n{resume_text}\n\nAnalysis Result:\n{response}"
    );
    Report {
        file_name,
        title,
        content,
    }
}
