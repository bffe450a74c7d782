// Resume scoring engine: map-reduce over applicants.
// Supervisor fans out one worker per applicant; each worker runs the fixed
// four-stage pipeline (retrieval → scoring → categorization → justification);
// worker outputs are reduced into one aggregate and bulk-persisted.
// All LLM calls go through llm_client — no direct API calls here.

pub mod handlers;
pub mod merge;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod service;
pub mod stages;
pub mod store;
pub mod supervisor;

#[cfg(test)]
pub mod testing;
