//! Shared stubs for pipeline tests: a scripted `CompletionClient` and an
//! in-memory `ApplicantStore` with per-applicant failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::llm_client::{CompletionClient, LlmError};
use crate::models::applicant::ProcessingApplicant;
use crate::scoring::record::AnalysisOutcome;
use crate::scoring::store::{AdmissionStore, ApplicantStore};

/// Scripted LLM stub. Rules are checked in insertion order: the first rule
/// whose pattern occurs in the prompt wins. Prompts matching a failure
/// pattern return an API error. Every prompt is recorded for call-count
/// assertions.
#[derive(Default)]
pub struct StubLlm {
    rules: Vec<(String, String)>,
    fail_patterns: Vec<String>,
    default_response: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn with_rule(mut self, pattern: &str, response: &str) -> Self {
        self.rules.push((pattern.to_string(), response.to_string()));
        self
    }

    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_patterns.push(pattern.to_string());
        self
    }

    pub fn with_default(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubLlm {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if self.fail_patterns.iter().any(|p| prompt.contains(p)) {
            return Err(LlmError::Api {
                status: 500,
                message: "stub failure".to_string(),
            });
        }

        for (pattern, response) in &self.rules {
            if prompt.contains(pattern) {
                return Ok(response.clone());
            }
        }

        self.default_response
            .clone()
            .ok_or(LlmError::EmptyContent)
    }
}

/// In-memory applicant store. Fetch fails for unknown ids or ids in the
/// fetch failure set; persist fails for ids in the persist failure set.
/// Processing locks live in `locks` keyed by applicant id, with the name
/// and the instant the lock was taken.
#[derive(Default)]
pub struct StubStore {
    resumes: HashMap<i64, String>,
    fail_fetch: HashSet<i64>,
    fail_persist: HashSet<i64>,
    persisted: Mutex<Vec<AnalysisOutcome>>,
    locks: Mutex<HashMap<i64, (String, DateTime<Utc>)>>,
}

impl StubStore {
    pub fn with_resume(mut self, applicant_id: i64, resume_text: &str) -> Self {
        self.resumes.insert(applicant_id, resume_text.to_string());
        self
    }

    pub fn failing_fetch_for(mut self, applicant_id: i64) -> Self {
        self.fail_fetch.insert(applicant_id);
        self
    }

    pub fn failing_persist_for(mut self, applicant_id: i64) -> Self {
        self.fail_persist.insert(applicant_id);
        self
    }

    pub fn persisted_ids(&self) -> Vec<i64> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.applicant_id)
            .collect()
    }

    pub fn persisted(&self) -> Vec<AnalysisOutcome> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn with_lock(self, applicant_id: i64, name: &str, locked_at: DateTime<Utc>) -> Self {
        self.locks
            .lock()
            .unwrap()
            .insert(applicant_id, (name.to_string(), locked_at));
        self
    }

    pub fn locked_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.locks.lock().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl ApplicantStore for StubStore {
    async fn fetch_resume_text(&self, applicant_id: i64) -> Result<String> {
        if self.fail_fetch.contains(&applicant_id) {
            return Err(anyhow!("stub store unavailable for {applicant_id}"));
        }
        self.resumes
            .get(&applicant_id)
            .cloned()
            .ok_or_else(|| anyhow!("Applicant {applicant_id} not found"))
    }

    async fn persist_outcome(&self, outcome: &AnalysisOutcome) -> Result<()> {
        if self.fail_persist.contains(&outcome.applicant_id) {
            return Err(anyhow!(
                "stub write failure for {}",
                outcome.applicant_id
            ));
        }
        self.persisted.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

#[async_trait]
impl AdmissionStore for StubStore {
    async fn reclaim_stale(&self, _job_id: i64, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut locks = self.locks.lock().unwrap();
        let before = locks.len();
        locks.retain(|_, (_, locked_at)| *locked_at >= cutoff);
        Ok((before - locks.len()) as u64)
    }

    async fn list_processing(&self, _job_id: i64) -> Result<Vec<ProcessingApplicant>> {
        let locks = self.locks.lock().unwrap();
        let mut processing: Vec<ProcessingApplicant> = locks
            .iter()
            .map(|(id, (name, _))| ProcessingApplicant {
                id: *id,
                applicant_name: name.clone(),
            })
            .collect();
        processing.sort_by_key(|p| p.id);
        Ok(processing)
    }

    async fn claim(&self, applicant_ids: &[i64], claimed_at: DateTime<Utc>) -> Result<()> {
        let mut locks = self.locks.lock().unwrap();
        for id in applicant_ids {
            locks.insert(*id, (format!("applicant {id}"), claimed_at));
        }
        Ok(())
    }
}
