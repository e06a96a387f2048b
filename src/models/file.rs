//! Changed-file types as reported by the GitHub commit payload.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Status of a file within the source commit.
///
/// Matches the `status` strings the GitHub commits API emits. Only
/// `removed` gets special treatment during reconciliation; every other
/// status carries (or legitimately omits) a textual patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

/// One file changed by the source commit.
///
/// Deserialized directly from the `files` array of
/// `GET /repos/{owner}/{repo}/commits/{ref}`. Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path (the API calls this `filename`).
    #[serde(rename = "filename")]
    pub path: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    /// Unified-diff hunks for this file. Absent for binary files and for
    /// files whose diff exceeds the API's size cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    /// Original path when `status` is `renamed` or `copied`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl ChangedFile {
    /// Number of lines in the raw patch text, 0 when the patch is absent.
    pub fn patch_lines(&self) -> usize {
        self.patch.as_deref().map_or(0, |p| p.lines().count())
    }
}
