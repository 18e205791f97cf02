//! Prompt construction for one phase.
//!
//! Pure transform over the phase definition, the phase input, and the
//! rendered context block. Absent optional pieces degrade to omitted
//! sections; there is no failure path.

use ponder_config::PhaseDef;

/// Literal token a task may embed to receive the rendered context in place.
/// When present, the context is substituted into the task instead of being
/// prepended as a separate block.
pub const CONTEXT_PLACEHOLDER: &str = "{{CONTEXT}}";

/// Named inputs for one phase invocation.
///
/// Only the first phase of a template carries a question; later phases take
/// everything through accumulated context. Revision notes appear only on
/// refinement re-invocations of the first phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseInput {
    pub question: Option<String>,
    pub revision_notes: Option<String>,
}

impl PhaseInput {
    /// Input for a phase that receives no direct data.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Input for the first phase.
    #[must_use]
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            revision_notes: None,
        }
    }

    /// Input for a refinement re-invocation of the first phase.
    #[must_use]
    pub fn revision(question: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            revision_notes: Some(notes.into()),
        }
    }

    /// Short description for the transcript's input field.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.question, &self.revision_notes) {
            (Some(q), Some(notes)) => format!("question: {q}; revisions: {notes}"),
            (Some(q), None) => format!("question: {q}"),
            _ => "accumulated context".to_string(),
        }
    }
}

/// Build the exact prompt text for a phase.
///
/// Layout, in order:
/// 1. the question verbatim (first phase only), plus revision notes when
///    refining;
/// 2. the context block, unless the task embeds [`CONTEXT_PLACEHOLDER`] and
///    consumes it in place;
/// 3. the task wrapped in a `<task>` envelope;
/// 4. when an output tag is configured, a trailing instruction naming the
///    exact wrapper tag.
#[must_use]
pub fn build_prompt(
    phase: &PhaseDef,
    input: &PhaseInput,
    context: &str,
    output_tag: Option<&str>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(question) = &input.question {
        parts.push(question.clone());
        if let Some(notes) = &input.revision_notes {
            parts.push(format!("Requested revisions: {notes}"));
        }
        parts.push(String::new());
    }

    let task = if phase.task.contains(CONTEXT_PLACEHOLDER) {
        phase.task.replace(CONTEXT_PLACEHOLDER, context)
    } else {
        if !context.is_empty() {
            parts.push(context.to_string());
            parts.push(String::new());
        }
        phase.task.clone()
    };

    parts.push("<task>".to_string());
    parts.push(task);
    parts.push("</task>".to_string());

    if let Some(tag) = output_tag {
        parts.push(String::new());
        parts.push(format!(
            "Wrap your complete answer in a single <{tag}> tag:\n\
             <{tag}>\n\
             ...your answer here...\n\
             </{tag}>\n\
             Do not write anything outside the <{tag}> wrapper."
        ));
    }

    parts.join("\n")
}
