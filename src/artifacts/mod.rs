//! On-disk persistence of conflict inputs.
//!
//! In preview mode with `--conflict-dir`, every conflicted file's base
//! text and raw patch are written side by side so the mismatch can be
//! inspected with local diff tooling.

use std::io;
use std::path::{Path, PathBuf};

use crate::models::ConflictRecord;

/// Write `<key>.base` and `<key>.patch` for each conflict, creating
/// `dir` if needed. Returns the paths written, in conflict order.
pub fn write_conflict_artifacts(
    dir: &Path,
    conflicts: &[ConflictRecord],
) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(conflicts.len() * 2);
    for conflict in conflicts {
        let key = artifact_key(&conflict.path);

        let base_path = dir.join(format!("{key}.base"));
        std::fs::write(&base_path, &conflict.base)?;
        written.push(base_path);

        let patch_path = dir.join(format!("{key}.patch"));
        std::fs::write(&patch_path, &conflict.patch)?;
        written.push(patch_path);
    }
    Ok(written)
}

/// Filesystem-safe key for a repository path.
fn artifact_key(path: &str) -> String {
    path.replace(['/', '\\'], "__")
}
