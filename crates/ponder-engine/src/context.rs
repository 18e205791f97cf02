//! Accumulated context from completed phases.
//!
//! One `ContextAccumulator` is owned by each run; there is no process-wide
//! state, so concurrent or repeated runs cannot interfere. Rendering is
//! computed fresh on every call, which matters for the refinement loop:
//! after the first phase's output is replaced, the next render picks up the
//! replacement with no stale pre-materialized value.

use std::collections::HashMap;

use ponder_config::Template;

/// Ordered store of phase outputs, rendered into the context block later
/// phases consume.
#[derive(Debug, Clone)]
pub struct ContextAccumulator {
    /// Phase ids in template order
    order: Vec<String>,
    /// Output tag per phase; empty in free-text mode
    tags: HashMap<String, String>,
    /// Recorded outputs, keyed by phase id
    outputs: HashMap<String, String>,
}

impl ContextAccumulator {
    /// Build an empty accumulator for one run of the given template.
    #[must_use]
    pub fn new(template: &Template) -> Self {
        let order: Vec<String> = template.phases.iter().map(|p| p.id.clone()).collect();
        let tags = template
            .phases
            .iter()
            .filter_map(|p| template.tag_for(&p.id).map(|tag| (p.id.clone(), tag)))
            .collect();

        Self {
            order,
            tags,
            outputs: HashMap::new(),
        }
    }

    /// Record (or overwrite) a phase's output.
    pub fn record(&mut self, phase_id: &str, content: impl Into<String>) {
        self.outputs.insert(phase_id.to_string(), content.into());
    }

    /// Recorded output for a phase, if any.
    #[must_use]
    pub fn get(&self, phase_id: &str) -> Option<&str> {
        self.outputs.get(phase_id).map(String::as_str)
    }

    /// Render the context visible to `up_to_phase`: every phase recorded
    /// strictly before it in template order, never the target itself.
    ///
    /// Each entry is wrapped in its semantic tag, or under a plain
    /// `=== PHASE <id> ===` header in free-text mode.
    #[must_use]
    pub fn render(&self, up_to_phase: &str) -> String {
        let mut parts = Vec::new();

        for id in &self.order {
            if id == up_to_phase {
                break;
            }
            let Some(content) = self.outputs.get(id) else {
                continue;
            };
            match self.tags.get(id) {
                Some(tag) => parts.push(format!("<{tag}>\n{content}\n</{tag}>")),
                None => parts.push(format!("=== PHASE {id} ===\n{content}")),
            }
        }

        parts.join("\n\n")
    }
}
