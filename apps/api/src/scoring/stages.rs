//! The four pipeline stages. Each stage takes the working record and
//! returns it updated; every failure is absorbed here as a safe default
//! plus an error increment and never crosses the stage boundary.

use tracing::warn;

use crate::llm_client::CompletionClient;
use crate::models::applicant::{clamp_score, Categorization, QualityGrade};
use crate::scoring::prompts::{
    ANALYST_SYSTEM, CATEGORIZATION_PROMPT_TEMPLATE, CATEGORIZATION_RETRY_TEMPLATE,
    JUSTIFICATION_PROMPT_TEMPLATE, SCORING_PROMPT_TEMPLATE,
};
use crate::scoring::record::{ApplicantWorkingRecord, JobContext, WorkerOutput};
use crate::scoring::store::ApplicantStore;

/// Stage 1 — retrieval. Loads the applicant's resume text from the store.
/// On failure the record is error-flagged, the resume stays empty, and later
/// stages score against no content.
pub async fn retrieval(
    mut record: ApplicantWorkingRecord,
    store: &dyn ApplicantStore,
) -> ApplicantWorkingRecord {
    match store.fetch_resume_text(record.applicant_id).await {
        Ok(text) => record.resume_text = text,
        Err(e) => {
            warn!(
                applicant_id = record.applicant_id,
                error = %e,
                "resume retrieval failed, continuing with empty text"
            );
            record.mark_error();
        }
    }
    record
}

/// Stage 2 — scoring and grading. One LLM call; the reply is parsed
/// line-by-line for the two labeled fields. Missing or malformed fields and
/// any LLM failure fall back to score 0 / grade F.
pub async fn score_and_grade(
    mut record: ApplicantWorkingRecord,
    ctx: &JobContext,
    llm: &dyn CompletionClient,
) -> ApplicantWorkingRecord {
    let prompt = SCORING_PROMPT_TEMPLATE
        .replace("{job_requirements}", &ctx.job_requirements)
        .replace("{resume_text}", &record.resume_text);

    match llm.complete(&prompt, ANALYST_SYSTEM).await {
        Ok(reply) => {
            let (score, grade) = parse_score_response(&reply);
            record.overall_score = score;
            record.quality_grade = grade;
        }
        Err(e) => {
            warn!(
                applicant_id = record.applicant_id,
                error = %e,
                "scoring call failed, defaulting to 0/F"
            );
            record.overall_score = 0;
            record.quality_grade = QualityGrade::F;
            record.mark_error();
        }
    }
    record
}

/// Stage 3 — categorization. One LLM call constrained to the four labels;
/// if the reply is invalid, exactly one corrective re-prompt quoting the bad
/// label. The second reply is taken as-is (coerced only through the enum, so
/// an unknown label still lands on Mismatched). Failure → Mismatched.
pub async fn categorize(
    mut record: ApplicantWorkingRecord,
    ctx: &JobContext,
    llm: &dyn CompletionClient,
) -> ApplicantWorkingRecord {
    let prompt = CATEGORIZATION_PROMPT_TEMPLATE
        .replace("{job_requirements}", &ctx.job_requirements)
        .replace("{resume_text}", &record.resume_text);

    let first = match llm.complete(&prompt, ANALYST_SYSTEM).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                applicant_id = record.applicant_id,
                error = %e,
                "categorization call failed, defaulting to Mismatched"
            );
            record.categorization = Categorization::Mismatched;
            record.mark_error();
            return record;
        }
    };

    record.categorization = match Categorization::parse(&first) {
        Some(category) => category,
        None => {
            // Bounded correction: one re-prompt, never a loop.
            let retry_prompt = CATEGORIZATION_RETRY_TEMPLATE
                .replace("{categorization}", first.trim())
                .replace("{resume_text}", &record.resume_text);

            match llm.complete(&retry_prompt, ANALYST_SYSTEM).await {
                Ok(second) => Categorization::coerce(&second),
                Err(e) => {
                    warn!(
                        applicant_id = record.applicant_id,
                        error = %e,
                        "categorization retry failed, defaulting to Mismatched"
                    );
                    record.mark_error();
                    Categorization::Mismatched
                }
            }
        }
    };
    record
}

/// Stage 4 — justification. One LLM call explaining the already-computed
/// score/grade/category. On failure the text is a synthesized message, never
/// empty. This stage always emits the worker's single output; even a fully
/// errored record produces one, so no applicant is silently dropped.
pub async fn justify(
    mut record: ApplicantWorkingRecord,
    ctx: &JobContext,
    llm: &dyn CompletionClient,
) -> WorkerOutput {
    let prompt = JUSTIFICATION_PROMPT_TEMPLATE
        .replace("{job_requirements}", &ctx.job_requirements)
        .replace("{resume_text}", &record.resume_text)
        .replace("{overall_score}", &record.overall_score.to_string())
        .replace("{quality_grade}", record.quality_grade.as_str())
        .replace("{categorization}", record.categorization.as_str());

    match llm.complete(&prompt, ANALYST_SYSTEM).await {
        Ok(reply) => {
            let reply = reply.trim();
            record.justification = if reply.is_empty() {
                synthesized_justification(&record)
            } else {
                reply.to_string()
            };
        }
        Err(e) => {
            warn!(
                applicant_id = record.applicant_id,
                error = %e,
                "justification call failed, synthesizing summary"
            );
            record.justification = synthesized_justification(&record);
            record.mark_error();
        }
    }
    record.into_output()
}

fn synthesized_justification(record: &ApplicantWorkingRecord) -> String {
    format!(
        "Automated analysis could not produce a narrative justification. \
         Assigned score {} with grade {} and categorization {}.",
        record.overall_score,
        record.quality_grade.as_str(),
        record.categorization.as_str()
    )
}

/// Tolerant parse of the scoring reply. Scans for the two labeled lines;
/// an absent or non-numeric score is 0, an absent grade is F, and the score
/// is clamped into 0..=100.
pub fn parse_score_response(reply: &str) -> (u8, QualityGrade) {
    let mut score = 0u8;
    let mut grade = QualityGrade::F;

    for line in reply.lines() {
        if let Some(rest) = line.split_once("Overall Score:").map(|(_, r)| r) {
            score = rest
                .trim()
                .parse::<i64>()
                .map(clamp_score)
                .unwrap_or(0);
        } else if let Some(rest) = line.split_once("Quality Grade:").map(|(_, r)| r) {
            grade = QualityGrade::coerce(rest);
        }
    }

    (score, grade)
}
