//! Atomic whole-file writes.
//!
//! Every store in the workspace rewrites its file in full. Writes go to a
//! temp file in the target's directory, are fsynced, and then renamed over
//! the target, so a reader never observes a half-written file.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// Write `contents` to `path` atomically (temp file → fsync → rename).
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    let _ = tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = contents.len(), "file written atomically");
    Ok(())
}
