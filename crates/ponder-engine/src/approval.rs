//! Human-in-the-loop approval of the first phase's output.
//!
//! The engine only sees the [`ApprovalGate`] capability; interactive runs
//! plug in [`ConsoleApproval`], automated runs use [`AutoApprove`].

use std::io::{BufRead, Write};

/// Verdict from one approval round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    /// Accept the output as-is; the run proceeds.
    Approved,
    /// Reject with suggested modifications; the phase is re-run.
    Rejected { suggestions: String },
    /// The collaborator ended the session (end of input).
    Interrupted,
}

/// Capability interface for the refinement loop's approval step.
pub trait ApprovalGate {
    /// Present `content` for review and return the verdict.
    fn review(&self, phase_name: &str, content: &str) -> Approval;
}

/// Approves everything immediately. Used for non-interactive runs, where
/// the refinement suspension point is elided entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ApprovalGate for AutoApprove {
    fn review(&self, _phase_name: &str, _content: &str) -> Approval {
        Approval::Approved
    }
}

/// Prompts on the terminal: an empty line or `y` approves, any other text
/// is taken as rejection suggestions, end of input interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleApproval;

impl ConsoleApproval {
    fn review_from(
        &self,
        phase_name: &str,
        content: &str,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Approval {
        let _ = writeln!(output, "\n--- {phase_name} ---");
        let _ = writeln!(output, "{content}");
        let _ = writeln!(output, "---");
        let _ = write!(
            output,
            "Accept this output? [enter/y = accept, or type requested changes] "
        );
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => Approval::Interrupted,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("y") {
                    Approval::Approved
                } else {
                    Approval::Rejected {
                        suggestions: trimmed.to_string(),
                    }
                }
            }
        }
    }
}

impl ApprovalGate for ConsoleApproval {
    fn review(&self, phase_name: &str, content: &str) -> Approval {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.review_from(phase_name, content, &mut stdin.lock(), &mut stdout)
    }
}
