//! ponder CLI binary
//!
//! Minimal entrypoint: all logic lives in the library, main.rs only maps
//! the CLI result to a process exit code.

fn main() {
    if let Err(code) = ponder::cli::run() {
        std::process::exit(code);
    }
}
