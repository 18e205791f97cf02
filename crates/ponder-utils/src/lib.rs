//! Shared infrastructure for the ponder workspace: the error taxonomy,
//! tracing setup, atomic file writes, and session-id derivation.

pub mod atomic_write;
pub mod error;
pub mod logging;
pub mod session_id;
