use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Letter grade assigned by the scoring stage. Anything the LLM returns
/// outside A–F coerces to `F` — raw model output never reaches the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    #[default]
    F,
}

impl QualityGrade {
    /// Tolerant parse of an LLM-produced grade. Accepts surrounding
    /// whitespace and either case; anything else is `F`.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => QualityGrade::A,
            "B" => QualityGrade::B,
            "C" => QualityGrade::C,
            "D" => QualityGrade::D,
            "F" => QualityGrade::F,
            _ => QualityGrade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::F => "F",
        }
    }
}

/// Seniority categorization. The four labels are a closed set; an invalid
/// label triggers one corrective re-prompt in the categorization stage and
/// ultimately coerces to `Mismatched`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Categorization {
    Senior,
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Junior,
    #[default]
    Mismatched,
}

impl Categorization {
    /// Strict match against the four allowed labels, used to decide whether
    /// the corrective re-prompt is needed. Whitespace-tolerant only.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Senior" => Some(Categorization::Senior),
            "Mid-Level" => Some(Categorization::MidLevel),
            "Junior" => Some(Categorization::Junior),
            "Mismatched" => Some(Categorization::Mismatched),
            _ => None,
        }
    }

    /// Coercing parse: invalid labels become `Mismatched`.
    pub fn coerce(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Categorization::Senior => "Senior",
            Categorization::MidLevel => "Mid-Level",
            Categorization::Junior => "Junior",
            Categorization::Mismatched => "Mismatched",
        }
    }
}

/// Clamps an LLM-reported score into the 0–100 contract range.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Full applicant row as stored. Status columns are plain text in the
/// schema; the scoring domain converts through the typed enums above.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: i64,
    pub job_id: i64,
    pub applicant_name: String,
    pub parsed_resume_text: Option<String>,
    pub overall_score: Option<i32>,
    pub quality_grade: Option<String>,
    pub categorization: Option<String>,
    pub justification_summary: Option<String>,
    /// pending | processing | completed | error
    pub processing_status: String,
    /// pending | analyzed | error
    pub analysis_status: String,
    pub analysis_timestamp: Option<DateTime<Utc>>,
    pub upload_date: DateTime<Utc>,
}

/// Minimal view of an applicant currently holding the processing lock,
/// returned in PROCESS_LOCKED conflict responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessingApplicant {
    pub id: i64,
    pub applicant_name: String,
}

/// Read model for the scored-applicants listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoredApplicantRow {
    pub id: i64,
    pub applicant_name: String,
    pub overall_score: Option<i32>,
    pub quality_grade: Option<String>,
    pub categorization: Option<String>,
    pub justification_summary: Option<String>,
    pub processing_status: String,
    pub upload_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_coerce_accepts_lowercase() {
        assert_eq!(QualityGrade::coerce(" b \n"), QualityGrade::B);
    }

    #[test]
    fn test_grade_coerce_garbage_is_f() {
        assert_eq!(QualityGrade::coerce("A+"), QualityGrade::F);
        assert_eq!(QualityGrade::coerce(""), QualityGrade::F);
        assert_eq!(QualityGrade::coerce("Excellent"), QualityGrade::F);
    }

    #[test]
    fn test_categorization_parse_exact_labels_only() {
        assert_eq!(Categorization::parse("Senior"), Some(Categorization::Senior));
        assert_eq!(
            Categorization::parse("  Mid-Level "),
            Some(Categorization::MidLevel)
        );
        assert_eq!(Categorization::parse("senior"), None);
        assert_eq!(Categorization::parse("Lead"), None);
    }

    #[test]
    fn test_categorization_coerce_invalid_is_mismatched() {
        assert_eq!(Categorization::coerce("Principal"), Categorization::Mismatched);
    }

    #[test]
    fn test_categorization_serde_uses_hyphenated_label() {
        let json = serde_json::to_string(&Categorization::MidLevel).unwrap();
        assert_eq!(json, r#""Mid-Level""#);
        let back: Categorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Categorization::MidLevel);
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(92), 92);
        assert_eq!(clamp_score(250), 100);
    }
}
