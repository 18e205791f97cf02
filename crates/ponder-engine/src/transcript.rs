//! Session transcripts and their persistence.
//!
//! A transcript is the complete record of one run: identifiers, the exact
//! prompt sent and raw response received per executed phase, and the final
//! outcome. It is appended to during the run, finalized once, and never
//! mutated after being persisted.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use ponder_utils::atomic_write::write_file_atomic;
use ponder_utils::error::PersistenceError;
use ponder_utils::session_id::session_id_at;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every phase completed.
    Completed,
    /// The run stopped at `phase` for `reason`; earlier phases' records are
    /// intact.
    Halted { phase: String, reason: String },
}

/// Full record of one executed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: String,
    pub name: String,
    /// Summary of the direct input this phase received
    pub input: String,
    /// Final extracted output content
    pub output: String,
    /// The exact prompt text sent to the model
    pub prompt_sent: String,
    /// The exact raw response received
    pub raw_response: String,
}

/// The run-level record handed to the persister.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub session_id: String,
    pub user_question: String,
    pub template_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<RunOutcome>,
    /// Phase records in execution order
    pub phases: Vec<PhaseRecord>,
}

impl SessionTranscript {
    /// Start a transcript for a new run. The session id derives from the
    /// start timestamp, unique per run.
    #[must_use]
    pub fn begin(user_question: impl Into<String>, template_name: impl Into<String>) -> Self {
        let started_at = Utc::now();
        Self {
            session_id: session_id_at(started_at),
            user_question: user_question.into(),
            template_name: template_name.into(),
            started_at,
            completed_at: None,
            outcome: None,
            phases: Vec::new(),
        }
    }

    /// Append a phase record, replacing any existing record with the same
    /// phase id. Replacement is the refinement path: a refined first phase
    /// overwrites its rejected draft wholesale.
    pub fn record_phase(&mut self, record: PhaseRecord) {
        if let Some(existing) = self.phases.iter_mut().find(|p| p.id == record.id) {
            *existing = record;
        } else {
            self.phases.push(record);
        }
    }

    /// Record for a phase id, if that phase executed.
    #[must_use]
    pub fn phase(&self, phase_id: &str) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    /// Stamp the completion time and final outcome.
    pub fn finalize(&mut self, outcome: RunOutcome) {
        self.completed_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }
}

/// Writes finalized transcripts as JSON artifacts.
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    output_dir: Utf8PathBuf,
}

impl TranscriptWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target path for a transcript, derived from its session id.
    #[must_use]
    pub fn artifact_path(&self, transcript: &SessionTranscript) -> Utf8PathBuf {
        self.output_dir
            .join(format!("ponder_session_{}.json", transcript.session_id))
    }

    /// Persist a finalized transcript.
    ///
    /// Refuses to overwrite an existing artifact. Failures here are
    /// side-channel: callers log them and keep the in-memory transcript.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the artifact exists or the write
    /// fails.
    pub fn write(&self, transcript: &SessionTranscript) -> Result<Utf8PathBuf, PersistenceError> {
        let path = self.artifact_path(transcript);

        if path.exists() {
            return Err(PersistenceError::AlreadyExists {
                path: path.to_string(),
            });
        }

        let json = serde_json::to_string_pretty(transcript).map_err(|e| {
            PersistenceError::WriteFailed {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;

        write_file_atomic(&path, &json).map_err(|e| PersistenceError::WriteFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        info!(path = %path, "Transcript written");
        Ok(path)
    }
}

impl Default for TranscriptWriter {
    fn default() -> Self {
        Self::new(Utf8Path::new(".").to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, output: &str) -> PhaseRecord {
        PhaseRecord {
            id: id.to_string(),
            name: format!("Phase {id}"),
            input: "accumulated context".to_string(),
            output: output.to_string(),
            prompt_sent: "prompt".to_string(),
            raw_response: "raw".to_string(),
        }
    }

    fn writer_in(dir: &TempDir) -> TranscriptWriter {
        TranscriptWriter::new(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap())
    }

    #[test]
    fn record_phase_replaces_same_id() {
        let mut transcript = SessionTranscript::begin("q", "t");
        transcript.record_phase(record("A", "draft"));
        transcript.record_phase(record("A", "refined"));
        transcript.record_phase(record("B", "second"));

        assert_eq!(transcript.phases.len(), 2);
        assert_eq!(transcript.phase("A").unwrap().output, "refined");
        assert_eq!(transcript.phases[0].id, "A");
        assert_eq!(transcript.phases[1].id, "B");
    }

    #[test]
    fn finalize_stamps_outcome_and_completion() {
        let mut transcript = SessionTranscript::begin("q", "t");
        assert!(transcript.completed_at.is_none());

        transcript.finalize(RunOutcome::Completed);
        assert!(transcript.completed_at.is_some());
        assert_eq!(transcript.outcome, Some(RunOutcome::Completed));
    }

    #[test]
    fn writer_persists_json_named_by_session_id() {
        let dir = TempDir::new().unwrap();
        let mut transcript = SessionTranscript::begin("What is creativity?", "deep-analysis");
        transcript.record_phase(record("A", "out"));
        transcript.finalize(RunOutcome::Completed);

        let path = writer_in(&dir).write(&transcript).unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            format!("ponder_session_{}.json", transcript.session_id)
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        let restored: SessionTranscript = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, transcript);
    }

    #[test]
    fn writer_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut transcript = SessionTranscript::begin("q", "t");
        transcript.finalize(RunOutcome::Completed);

        let writer = writer_in(&dir);
        writer.write(&transcript).unwrap();
        let err = writer.write(&transcript).unwrap_err();
        assert!(matches!(err, PersistenceError::AlreadyExists { .. }));
    }

    #[test]
    fn halted_outcome_serializes_with_phase_and_reason() {
        let outcome = RunOutcome::Halted {
            phase: "3".to_string(),
            reason: "no extractable content".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "halted");
        assert_eq!(json["phase"], "3");

        let restored: RunOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(restored, outcome);
    }
}
