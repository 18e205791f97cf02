//! Pipeline templates: the ordered phase list plus shared model
//! configuration for one full run.
//!
//! Templates are JSON files shaped as:
//!
//! ```json
//! {
//!   "template_name": "deep-analysis",
//!   "system_prompt": "You are a rigorous analyst.",
//!   "model_config": { "model": "openai/gpt-oss-120b", "temperature": 0.8 },
//!   "phase_tags": { "A": "reformulated", "B": "critique" },
//!   "phase_schemas": { "A": { "reformulated_question": "string" } },
//!   "phases": [ { "id": "A", "name": "Reframe", "task": "..." } ]
//! }
//! ```
//!
//! Extraction mode is a per-template capability: a `phase_tags` table selects
//! tagged extraction (entries missing from the table fall back to a generated
//! `phase_<id>` tag), `phase_schemas` additionally enforces a JSON field
//! contract, and a template with neither runs in free-text mode.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ModelConfig;
use ponder_utils::error::TemplateError;

/// One step of the pipeline: a fixed instruction plus the rules for
/// extracting its answer. Immutable after template load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDef {
    /// Unique ordinal token ("A", "0", "1", ...). Ordering comes from the
    /// template's phase list, never from the id itself.
    pub id: String,
    /// Human label
    pub name: String,
    /// Instruction text; may embed the literal `{{CONTEXT}}` placeholder
    pub task: String,
}

/// Expected JSON kind of one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    List,
    Object,
}

impl FieldKind {
    /// Name used in wrong-kind diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }
}

/// A loaded pipeline template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub template_name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub model_config: ModelConfig,
    /// Per-phase output tag names. Presence of this table selects tagged
    /// extraction; absence means free-text mode.
    #[serde(default)]
    pub phase_tags: Option<HashMap<String, String>>,
    /// Per-phase structured-output contracts. `BTreeMap` keeps diagnostics
    /// deterministic.
    #[serde(default)]
    pub phase_schemas: Option<HashMap<String, BTreeMap<String, FieldKind>>>,
    pub phases: Vec<PhaseDef>,
}

impl Template {
    /// Load and validate a template from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` for a missing file, malformed JSON, an empty
    /// phase list, or duplicate phase ids.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|_| TemplateError::NotFound {
            path: display.clone(),
        })?;
        let template: Self =
            serde_json::from_str(&raw).map_err(|e| TemplateError::InvalidJson {
                path: display,
                reason: e.to_string(),
            })?;
        template.validate()?;
        Ok(template)
    }

    /// Validate structural invariants after deserialization.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NoPhases` or `TemplateError::DuplicatePhaseId`.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.phases.is_empty() {
            return Err(TemplateError::NoPhases {
                name: self.template_name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for phase in &self.phases {
            if !seen.insert(phase.id.as_str()) {
                return Err(TemplateError::DuplicatePhaseId {
                    name: self.template_name.clone(),
                    id: phase.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Output tag for a phase.
    ///
    /// Returns `None` in free-text mode (no `phase_tags` table). When the
    /// table is present but has no entry for this phase, a `phase_<id>` tag
    /// is generated.
    #[must_use]
    pub fn tag_for(&self, phase_id: &str) -> Option<String> {
        self.phase_tags.as_ref().map(|tags| {
            tags.get(phase_id)
                .cloned()
                .unwrap_or_else(|| format!("phase_{phase_id}"))
        })
    }

    /// Declared structured-output contract for a phase, if any.
    #[must_use]
    pub fn schema_for(&self, phase_id: &str) -> Option<&BTreeMap<String, FieldKind>> {
        self.phase_schemas
            .as_ref()
            .and_then(|schemas| schemas.get(phase_id))
    }
}
