//! The structured run report handed to renderers.
//!
//! The core returns data; formatting (terminal, JSON) lives in
//! `crate::output`.

use serde::Serialize;

use crate::models::file::{ChangedFile, FileStatus};
use crate::models::outcome::{ConflictRecord, Summary};
use crate::models::RunMode;

/// One row of the per-file report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    pub additions: u32,
    pub deletions: u32,
    pub patch_lines: usize,
}

impl FileReport {
    pub fn from_changed_file(file: &ChangedFile) -> Self {
        Self {
            path: file.path.clone(),
            status: file.status,
            additions: file.additions,
            deletions: file.deletions,
            patch_lines: file.patch_lines(),
        }
    }
}

/// The only externally visible artifact of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    /// Source commit SHA (as given on the command line).
    pub source: String,
    /// Target branch name.
    pub target: String,
    /// Target branch head SHA at the time the run started.
    pub target_head: String,
    pub files: Vec<FileReport>,
    pub summary: Summary,
    pub conflicts: Vec<ConflictRecord>,
    /// SHA of the commit created on the target branch, commit mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_commit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_report_from_changed_file() {
        let file = ChangedFile {
            path: "src/main.rs".into(),
            status: FileStatus::Modified,
            additions: 2,
            deletions: 1,
            patch: Some("@@ -1,2 +1,3 @@\n line\n-a\n+b\n+c".into()),
            previous_filename: None,
        };
        let report = FileReport::from_changed_file(&file);
        assert_eq!(report.path, "src/main.rs");
        assert_eq!(report.additions, 2);
        assert_eq!(report.deletions, 1);
        assert_eq!(report.patch_lines, 5);
    }

    #[test]
    fn run_report_json_shape() {
        let report = RunReport {
            mode: RunMode::Preview,
            source: "abc123".into(),
            target: "main".into(),
            target_head: "def456".into(),
            files: vec![],
            summary: Summary::default(),
            conflicts: vec![],
            new_commit: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "preview");
        assert_eq!(json["target"], "main");
        assert!(json.get("new_commit").is_none());
    }
}
