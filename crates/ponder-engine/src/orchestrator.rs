//! The phase engine: drives a template's phases through prompt building,
//! the LLM gateway, extraction, validation, and context accumulation.
//!
//! Execution is strictly sequential; every phase's prompt depends on all
//! prior phases' outputs, so there is nothing to parallelize. The engine
//! halts on the first unrecoverable phase failure and always hands back the
//! transcript accumulated so far.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, info, warn};

use ponder_config::{PhaseDef, Template};
use ponder_llm::{LlmBackend, LlmInvocation, Message};
use ponder_utils::error::{PhaseError, PonderError};

use crate::approval::{Approval, ApprovalGate};
use crate::context::ContextAccumulator;
use crate::extract::extract_content;
use crate::prompt::{PhaseInput, build_prompt};
use crate::schema::validate_phase_output;
use crate::transcript::{PhaseRecord, RunOutcome, SessionTranscript};

/// Engine states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// Executing the phase at this template index
    RunningPhase(usize),
    /// Waiting on the approval gate for the first phase's output
    AwaitingApproval,
    Halted,
    Completed,
}

/// Result of one full run: the transcript plus the failure that halted it,
/// when there was one. The transcript is present either way; a halted run
/// keeps every completed phase's record for inspection and persistence.
#[derive(Debug)]
pub struct RunReport {
    pub transcript: SessionTranscript,
    pub failure: Option<PonderError>,
}

impl RunReport {
    /// Whether every phase completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.transcript.outcome, Some(RunOutcome::Completed))
    }
}

/// Everything produced by one successful phase execution.
struct PhaseExecution {
    content: String,
    prompt: String,
    raw_response: String,
}

/// Orchestrates one pipeline run.
pub struct PhaseOrchestrator {
    template: Template,
    backend: Box<dyn LlmBackend>,
    approval: Box<dyn ApprovalGate>,
    request_timeout: Duration,
    state: EngineState,
}

impl PhaseOrchestrator {
    #[must_use]
    pub fn new(
        template: Template,
        backend: Box<dyn LlmBackend>,
        approval: Box<dyn ApprovalGate>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            template,
            backend,
            approval,
            request_timeout,
            state: EngineState::Idle,
        }
    }

    /// Current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run every phase of the template, in template order, for `question`.
    ///
    /// Returns the transcript in all cases. On the first gateway error,
    /// empty response, failed extraction, schema violation, or interrupt,
    /// the engine transitions to `Halted`, records which phase failed and
    /// why, and executes no further phases.
    pub async fn run(&mut self, question: &str) -> RunReport {
        let mut transcript =
            SessionTranscript::begin(question, self.template.template_name.clone());
        let mut ctx = ContextAccumulator::new(&self.template);

        info!(
            session_id = %transcript.session_id,
            template = %self.template.template_name,
            phases = self.template.phases.len(),
            "Starting pipeline run"
        );

        let phases = self.template.phases.clone();
        for (idx, phase) in phases.iter().enumerate() {
            self.transition(EngineState::RunningPhase(idx));
            info!(phase = %phase.id, name = %phase.name, "Executing phase");

            let input = if idx == 0 {
                PhaseInput::question(question)
            } else {
                PhaseInput::none()
            };
            let context_block = ctx.render(&phase.id);

            let exec = match self.execute_phase(phase, &input, &context_block).await {
                Ok(exec) => exec,
                Err(err) => return self.halt(transcript, &phase.id, err),
            };

            ctx.record(&phase.id, exec.content.clone());
            transcript.record_phase(Self::phase_record(phase, &input, exec));

            if idx == 0 {
                if let Err(err) = self
                    .refine_first_phase(phase, question, &mut ctx, &mut transcript)
                    .await
                {
                    return self.halt(transcript, &phase.id, err);
                }
            }
        }

        self.transition(EngineState::Completed);
        transcript.finalize(RunOutcome::Completed);
        info!(session_id = %transcript.session_id, "Pipeline run completed");

        RunReport {
            transcript,
            failure: None,
        }
    }

    /// Approval sub-loop for the first phase. On rejection the phase re-runs
    /// with the original question plus the suggestions and no accumulated
    /// context, mirroring the original first-phase call; the stored output
    /// is replaced wholesale each cycle.
    async fn refine_first_phase(
        &mut self,
        phase: &PhaseDef,
        question: &str,
        ctx: &mut ContextAccumulator,
        transcript: &mut SessionTranscript,
    ) -> Result<(), PonderError> {
        loop {
            self.transition(EngineState::AwaitingApproval);
            let current = ctx.get(&phase.id).unwrap_or_default().to_string();

            match self.approval.review(&phase.name, &current) {
                Approval::Approved => {
                    debug!(phase = %phase.id, "Output approved");
                    return Ok(());
                }
                Approval::Interrupted => {
                    warn!(phase = %phase.id, "Approval interrupted");
                    return Err(PhaseError::Interrupted {
                        phase: phase.id.clone(),
                    }
                    .into());
                }
                Approval::Rejected { suggestions } => {
                    info!(phase = %phase.id, "Output rejected, refining");
                    let input = PhaseInput::revision(question, suggestions);
                    let exec = self.execute_phase(phase, &input, "").await?;

                    ctx.record(&phase.id, exec.content.clone());
                    transcript.record_phase(Self::phase_record(phase, &input, exec));
                }
            }
        }
    }

    /// Execute one phase end-to-end: prompt, model call, extraction, and
    /// schema validation when the template declares a contract.
    async fn execute_phase(
        &self,
        phase: &PhaseDef,
        input: &PhaseInput,
        context: &str,
    ) -> Result<PhaseExecution, PonderError> {
        let output_tag = self.template.tag_for(&phase.id);
        let prompt = build_prompt(phase, input, context, output_tag.as_deref());
        debug!(phase = %phase.id, prompt_bytes = prompt.len(), "Built prompt");

        let raw_response = self.invoke_model(&phase.id, &prompt).await?;

        let Some(content) = extract_content(&raw_response, output_tag.as_deref()) else {
            let err = if raw_response.trim().is_empty() {
                PhaseError::EmptyResponse {
                    phase: phase.id.clone(),
                }
            } else {
                PhaseError::ExtractionFailed {
                    phase: phase.id.clone(),
                    raw_response: raw_response.clone(),
                }
            };
            return Err(err.into());
        };

        if let Some(schema) = self.template.schema_for(&phase.id) {
            validate_phase_output(&phase.id, &content, schema)?;
        }

        Ok(PhaseExecution {
            content,
            prompt,
            raw_response,
        })
    }

    /// Send one prompt through the gateway, racing it against Ctrl-C so an
    /// interrupt during the blocking model call halts cleanly with partial
    /// results intact.
    async fn invoke_model(&self, phase_id: &str, prompt: &str) -> Result<String, PonderError> {
        let mc = &self.template.model_config;

        let mut messages = Vec::new();
        if !self.template.system_prompt.is_empty() {
            messages.push(Message::system(self.template.system_prompt.clone()));
        }
        messages.push(Message::user(prompt));

        let invocation =
            LlmInvocation::new(phase_id, mc.model.clone(), self.request_timeout, messages)
                .with_metadata("temperature", json!(mc.temperature))
                .with_metadata("max_tokens", json!(mc.max_tokens))
                .with_metadata("top_p", json!(mc.top_p));

        tokio::select! {
            result = self.backend.invoke(invocation) => {
                let llm_result = result.map_err(PonderError::Llm)?;
                Ok(llm_result.raw_response)
            }
            _ = tokio::signal::ctrl_c() => {
                warn!(phase = phase_id, "Interrupted during model call");
                Err(PhaseError::Interrupted { phase: phase_id.to_string() }.into())
            }
        }
    }

    fn phase_record(phase: &PhaseDef, input: &PhaseInput, exec: PhaseExecution) -> PhaseRecord {
        PhaseRecord {
            id: phase.id.clone(),
            name: phase.name.clone(),
            input: input.summary(),
            output: exec.content,
            prompt_sent: exec.prompt,
            raw_response: exec.raw_response,
        }
    }

    fn halt(
        &mut self,
        mut transcript: SessionTranscript,
        phase_id: &str,
        err: PonderError,
    ) -> RunReport {
        self.transition(EngineState::Halted);
        error!(phase = phase_id, error = %err, "Halting run");

        transcript.finalize(RunOutcome::Halted {
            phase: phase_id.to_string(),
            reason: err.to_string(),
        });

        RunReport {
            transcript,
            failure: Some(err),
        }
    }

    fn transition(&mut self, next: EngineState) {
        debug!(from = ?self.state, to = ?next, "State transition");
        self.state = next;
    }
}
