//! CLI argument definitions.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ponder - multi-phase LLM reasoning pipeline
#[derive(Parser)]
#[command(name = "ponder")]
#[command(about = "Drive an LLM through a multi-phase reasoning template")]
#[command(long_about = r#"
ponder runs a language model through an ordered sequence of reasoning phases
defined by a JSON template. Each phase's output accumulates as context for
later phases, and every run is persisted as a session transcript.

EXAMPLES:
  # Validate a template file
  ponder validate --template demos/deep_analysis.json

  # Run a full pipeline
  ponder run --template demos/deep_analysis.json --question "What is creativity?"

  # Review and refine the first phase's output before the rest of the run
  ponder run --template demos/deep_analysis.json --question "..." --interactive

CONFIGURATION:
  GROQ_API_KEY        API key for the model provider (required for `run`)
  PONDER_OUTPUT_DIR   Directory transcripts are written to (default: CWD);
                      the --output-dir flag takes precedence
"#)]
#[command(version)]
pub struct Cli {
    /// Enable debug-level logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline for a question
    Run {
        /// Path to the template JSON file
        #[arg(long, short = 't')]
        template: PathBuf,

        /// The question to analyze
        #[arg(long, short = 'q')]
        question: String,

        /// Review and refine the first phase's output interactively
        #[arg(long)]
        interactive: bool,

        /// Directory to write the session transcript to
        #[arg(long)]
        output_dir: Option<Utf8PathBuf>,

        /// Override the template's model identifier
        #[arg(long)]
        model: Option<String>,
    },

    /// Check that a template file is well-formed
    Validate {
        /// Path to the template JSON file
        #[arg(long, short = 't')]
        template: PathBuf,
    },
}
