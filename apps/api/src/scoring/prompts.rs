// All LLM prompt constants for the scoring pipeline.
// Placeholders are replaced with `str::replace` before sending.

/// Shared system prompt for every scoring-pipeline call.
pub const ANALYST_SYSTEM: &str = "You are an expert technical recruiter analyzing resumes \
    against job requirements. Follow the requested output format exactly. \
    Do NOT include explanations outside the requested format.";

/// Scoring/grading prompt. Replace `{job_requirements}` and `{resume_text}`.
/// The response is parsed line-by-line for the two labeled fields.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Analyze the following resume against these job requirements:

Job Requirements: {job_requirements}

Resume: {resume_text}

Based on how well the resume matches the job requirements, provide:
1. An overall score from 0-100 (where 100 is perfect match)
2. A quality grade (A, B, C, D, or F)

Respond in the following format:
Overall Score: [number]
Quality Grade: [letter]"#;

/// Categorization prompt constrained to the four allowed labels.
/// Replace `{job_requirements}` and `{resume_text}`.
pub const CATEGORIZATION_PROMPT_TEMPLATE: &str = r#"Based on the following resume and job requirements, categorize the candidate:

Job Requirements: {job_requirements}

Resume: {resume_text}

Categorize as one of: Senior, Mid-Level, Junior, or Mismatched

Respond with only the category name."#;

/// Single corrective re-prompt issued when the first categorization reply is
/// not one of the four labels. Replace `{categorization}` (the invalid label)
/// and `{resume_text}`.
pub const CATEGORIZATION_RETRY_TEMPLATE: &str = r#"The category {categorization} is not valid. Choose one of: Senior, Mid-Level, Junior, or Mismatched
Based on this resume: {resume_text}

Respond with only the valid category name."#;

/// Justification prompt. Replace `{job_requirements}`, `{resume_text}`,
/// `{overall_score}`, `{quality_grade}`, `{categorization}`.
pub const JUSTIFICATION_PROMPT_TEMPLATE: &str = r#"Provide a brief justification for the scores given to this candidate:

Job Requirements: {job_requirements}

Resume: {resume_text}

Overall Score: {overall_score}
Quality Grade: {quality_grade}
Categorization: {categorization}

Explain in 1-2 sentences why these scores were given, mentioning specific strengths or weaknesses."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_their_placeholders() {
        assert!(SCORING_PROMPT_TEMPLATE.contains("{job_requirements}"));
        assert!(SCORING_PROMPT_TEMPLATE.contains("{resume_text}"));
        assert!(CATEGORIZATION_PROMPT_TEMPLATE.contains("{resume_text}"));
        assert!(CATEGORIZATION_RETRY_TEMPLATE.contains("{categorization}"));
        assert!(JUSTIFICATION_PROMPT_TEMPLATE.contains("{overall_score}"));
        assert!(JUSTIFICATION_PROMPT_TEMPLATE.contains("{quality_grade}"));
        assert!(JUSTIFICATION_PROMPT_TEMPLATE.contains("{categorization}"));
    }

    #[test]
    fn test_categorization_prompt_names_all_four_labels() {
        for label in ["Senior", "Mid-Level", "Junior", "Mismatched"] {
            assert!(CATEGORIZATION_PROMPT_TEMPLATE.contains(label));
            assert!(CATEGORIZATION_RETRY_TEMPLATE.contains(label));
        }
    }
}
