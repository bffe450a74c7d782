use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Job listing row. `required_skills` is free-form key/value criteria;
/// `detailed_description` is the requirements text handed to every worker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub detailed_description: Option<String>,
    pub required_skills: Value,
    pub created_at: DateTime<Utc>,
}
