//! Atomic file writes: temp file in the target directory, fsync, rename.
//!
//! Used by the transcript writer so a crash mid-write never leaves a
//! truncated artifact behind.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Atomically write `content` to `path`.
///
/// Content is normalized to LF line endings and UTF-8 encoded. The temp file
/// is created in the target's parent directory so the final rename stays on
/// one filesystem.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let normalized = normalize_line_endings(content);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(normalized.as_bytes())
        .context("Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    temp_file
        .persist(path.as_std_path())
        .with_context(|| format!("Failed to rename temporary file into place: {path}"))?;

    Ok(())
}

/// Normalize CRLF and bare CR line endings to LF.
fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn temp_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    fn writes_content_to_new_file() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.json");

        write_file_atomic(&path, "{\"k\": 1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"k\": 1}");
    }

    #[test]
    fn replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.txt");

        write_file_atomic(&path, "first").unwrap();
        write_file_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "nested/deeper/out.txt");

        write_file_atomic(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn normalizes_line_endings_to_lf() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");

        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "lf.txt");
        write_file_atomic(&path, "line1\r\nline2").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line1\nline2");
    }
}
