// Instruction templates for the fixed analysis intents.
// Each template is sent as the first content part, ahead of the resume and the JD.

/// General fit assessment. Also the only template used by comparison mode.
pub const SUMMARIZE_FIT_PROMPT: &str = "\
    As an experienced Human Resource Manager, your role is to assess the provided resume \
    in relation to the job description. \
    Evaluate the candidate's qualifications, experiences, and skills against the specified requirements. \
    Please highlight the strengths that align well with the role and any weaknesses or gaps \
    that may need addressing.";

/// Fit insights with constructive feedback on skill development.
pub const SUGGEST_IMPROVEMENTS_PROMPT: &str = "\
    You are a Human Resource Manager with expertise in evaluating talent across various fields. \
    Carefully analyze the resume in the context of the job description provided. \
    Share your insights regarding the candidate's fit for the role, and offer constructive feedback \
    on areas for improvement and skill enhancement.";

/// ATS-style missing keyword review.
pub const FIND_MISSING_KEYWORDS_PROMPT: &str = "\
    You are an ATS (Applicant Tracking System) specialist. Evaluate the resume against the job description. \
    Identify any critical keywords that are missing from the resume and suggest improvements \
    to ensure the candidate's profile stands out. \
    Provide additional recommendations for enhancing the candidate's overall presentation \
    and alignment with the role.";

/// ATS-style percentage match.
pub const COMPUTE_MATCH_PERCENTAGE_PROMPT: &str = "\
    You are an ATS expert tasked with evaluating the compatibility of the resume with the provided \
    job description. \
    Calculate the percentage match between the two documents. \
    Additionally, list the missing keywords and provide final thoughts on the candidate's suitability \
    for the role, including any suggestions for strengthening their application.";
