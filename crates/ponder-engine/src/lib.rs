//! Phase engine for ponder.
//!
//! This crate owns the orchestration core: for a template and a user
//! question, each phase flows through prompt building, the LLM gateway,
//! content extraction, optional schema validation, and context accumulation,
//! with a human-in-the-loop refinement sub-loop on the first phase and a
//! persisted transcript of the whole run.

mod approval;
mod context;
mod extract;
mod orchestrator;
mod prompt;
mod schema;
mod transcript;


pub use approval::{Approval, ApprovalGate, AutoApprove, ConsoleApproval};
pub use context::ContextAccumulator;
pub use extract::extract_content;
pub use orchestrator::{EngineState, PhaseOrchestrator, RunReport};
pub use prompt::{CONTEXT_PLACEHOLDER, PhaseInput, build_prompt};
pub use schema::validate_phase_output;
pub use transcript::{PhaseRecord, RunOutcome, SessionTranscript, TranscriptWriter};
