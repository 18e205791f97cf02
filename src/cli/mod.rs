//! CLI command dispatch.
//!
//! `run()` owns all user-facing output, including error reporting; it
//! returns the process exit code for main.rs to apply.

mod args;

pub use args::{Cli, Command};

use std::path::Path;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing::warn;

use ponder_config::{Settings, Template};
use ponder_engine::{
    ApprovalGate, AutoApprove, ConsoleApproval, PhaseOrchestrator, TranscriptWriter,
};
use ponder_utils::error::PonderError;

/// Parse arguments and execute the selected command.
///
/// # Errors
///
/// Returns the process exit code on failure: 2 for usage and template
/// problems, 1 for runtime failures.
pub fn run() -> Result<(), i32> {
    let cli = Cli::parse();

    if let Err(e) = ponder_utils::logging::init_tracing(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    match cli.command {
        Command::Validate { template } => validate(&template),
        Command::Run {
            template,
            question,
            interactive,
            output_dir,
            model,
        } => run_pipeline(&template, &question, interactive, output_dir, model),
    }
}

fn validate(template_path: &Path) -> Result<(), i32> {
    let template = load_template(template_path)?;
    println!(
        "Template '{}' is valid: {} phase(s), model {}",
        template.template_name,
        template.phases.len(),
        template.model_config.model
    );
    Ok(())
}

fn run_pipeline(
    template_path: &Path,
    question: &str,
    interactive: bool,
    output_dir: Option<Utf8PathBuf>,
    model: Option<String>,
) -> Result<(), i32> {
    let mut template = load_template(template_path)?;
    if let Some(model) = model {
        template.model_config.model = model;
    }

    let mut settings = Settings::from_env();
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }

    let backend = ponder_llm::from_settings(&settings).map_err(|e| {
        let err = PonderError::Llm(e);
        eprintln!("{err}");
        err.exit_code()
    })?;

    let approval: Box<dyn ApprovalGate> = if interactive {
        Box::new(ConsoleApproval)
    } else {
        Box::new(AutoApprove)
    };

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("failed to start async runtime: {e}");
        1
    })?;

    let mut engine = PhaseOrchestrator::new(
        template,
        backend,
        approval,
        settings.request_timeout,
    );
    let report = runtime.block_on(engine.run(question));

    // Persistence failures are side-channel: the run's result stands either way.
    let writer = TranscriptWriter::new(settings.output_dir.clone());
    match writer.write(&report.transcript) {
        Ok(path) => println!("Transcript written to {path}"),
        Err(e) => warn!(error = %e, "Transcript not persisted"),
    }

    let total = report.transcript.phases.len();
    println!(
        "Session {}: {} phase(s) completed",
        report.transcript.session_id, total
    );

    match report.failure {
        None => Ok(()),
        Some(err) => {
            eprintln!("{err}");
            Err(err.exit_code())
        }
    }
}

fn load_template(path: &Path) -> Result<Template, i32> {
    Template::load(path).map_err(|e| {
        let err = PonderError::Template(e);
        eprintln!("{err}");
        err.exit_code()
    })
}
