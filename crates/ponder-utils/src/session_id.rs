//! Session identifiers derived from the run start time.
//!
//! One id per pipeline run, second precision, sortable lexicographically in
//! chronological order. The transcript filename embeds it.

use chrono::{DateTime, Utc};

/// Format a session id from an explicit start timestamp.
#[must_use]
pub fn session_id_at(started_at: DateTime<Utc>) -> String {
    started_at.format("%Y%m%d_%H%M%S").to_string()
}

/// Derive a session id from the current time.
#[must_use]
pub fn new_session_id() -> String {
    session_id_at(Utc::now())
}
