//! Error taxonomy for ponder.
//!
//! `PonderError` is the top-level error returned by library operations. Leaf
//! enums map one-to-one onto the failure classes of the pipeline: template
//! loading, LLM transport, per-phase extraction/validation, and transcript
//! persistence. Library code returns errors; only the CLI maps them to
//! process exit codes.

use std::time::Duration;
use thiserror::Error;

/// Top-level library error.
#[derive(Error, Debug)]
pub enum PonderError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Phase execution error: {0}")]
    Phase(#[from] PhaseError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PonderError {
    /// Map to the CLI exit code table: 2 for usage/template problems,
    /// 1 for everything else. Persistence failures are side-channel and
    /// never reach this path on an otherwise successful run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Template(_) => 2,
            _ => 1,
        }
    }
}

/// Template file problems. Fatal before any phase executes.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template file not found: {path}")]
    NotFound { path: String },

    #[error("invalid JSON in template {path}: {reason}")]
    InvalidJson { path: String, reason: String },

    #[error("template '{name}' declares no phases")]
    NoPhases { name: String },

    #[error("template '{name}' declares duplicate phase id '{id}'")]
    DuplicatePhaseId { name: String, id: String },
}

/// LLM gateway failures. Halts the current phase and the run; results from
/// earlier phases stay in the transcript.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, malformed response body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration error (missing API key env var, bad base URL)
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unknown provider name
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Per-phase failures surfaced by the engine. Each carries the phase id so
/// a halted run can be diagnosed without re-running.
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("phase {phase}: model returned an empty response")]
    EmptyResponse { phase: String },

    #[error("phase {phase}: no extractable content in model response")]
    ExtractionFailed {
        phase: String,
        /// The exact raw response, preserved for diagnosis.
        raw_response: String,
    },

    #[error(
        "phase {phase}: output violates declared schema (missing: {missing_fields:?}; wrong kind: {wrong_kinds:?})"
    )]
    SchemaViolation {
        phase: String,
        missing_fields: Vec<String>,
        wrong_kinds: Vec<String>,
    },

    #[error("phase {phase}: interrupted")]
    Interrupted { phase: String },
}

/// Transcript persistence failures. Non-fatal: logged, the in-memory
/// transcript already returned to the caller is unaffected.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to write transcript to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("transcript already exists at {path}")]
    AlreadyExists { path: String },
}
