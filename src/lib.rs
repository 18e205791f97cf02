//! ponder - multi-phase LLM reasoning pipeline
//!
//! ponder drives a language model through an ordered sequence of
//! interdependent phases defined by a JSON template. Each phase's extracted
//! output accumulates as context for later phases, the first phase's output
//! can be refined interactively, and every run persists a full transcript
//! (prompts, raw responses, extracted outputs) as a session artifact.
//!
//! # Quick start (CLI)
//!
//! ```bash
//! export GROQ_API_KEY=...
//!
//! # Check a template file
//! ponder validate --template demos/deep_analysis.json
//!
//! # Run the pipeline
//! ponder run --template demos/deep_analysis.json \
//!     --question "What is creativity?"
//!
//! # Review and refine the first phase's output interactively
//! ponder run --template demos/deep_analysis.json \
//!     --question "What is creativity?" --interactive
//! ```
//!
//! # Quick start (library)
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ponder::{AutoApprove, PhaseOrchestrator, Settings, Template};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let template = Template::load(std::path::Path::new("template.json"))?;
//! let settings = Settings::from_env();
//! let backend = ponder::llm::from_settings(&settings)?;
//!
//! let mut engine = PhaseOrchestrator::new(
//!     template,
//!     backend,
//!     Box::new(AutoApprove),
//!     Duration::from_secs(300),
//! );
//! let report = engine.run("What is creativity?").await;
//! println!("{}", report.transcript.session_id);
//! # Ok(())
//! # }
//! ```

// Configuration model
pub use ponder_config::{FieldKind, ModelConfig, PhaseDef, Settings, Template};

// Engine
pub use ponder_engine::{
    Approval, ApprovalGate, AutoApprove, ConsoleApproval, ContextAccumulator, EngineState,
    PhaseOrchestrator, PhaseRecord, RunOutcome, RunReport, SessionTranscript, TranscriptWriter,
};

// LLM gateway
pub use ponder_llm as llm;
pub use ponder_llm::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

// Error taxonomy
pub use ponder_utils::error::{
    LlmError, PersistenceError, PhaseError, PonderError, TemplateError,
};

pub mod cli;
