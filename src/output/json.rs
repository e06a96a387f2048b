//! JSON renderer: the run report, verbatim, for scripting.

use crate::models::RunReport;
use crate::output::ReportRenderer;

/// Machine-readable renderer.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileReport, FileStatus, RunMode, Summary};
    use pretty_assertions::assert_eq;

    #[test]
    fn render_is_valid_json() {
        let report = RunReport {
            mode: RunMode::Preview,
            source: "abc".into(),
            target: "main".into(),
            target_head: "def".into(),
            files: vec![FileReport {
                path: "a.txt".into(),
                status: FileStatus::Added,
                additions: 1,
                deletions: 0,
                patch_lines: 2,
            }],
            summary: Summary { applied: 1, skipped: 0, conflicted: 0 },
            conflicts: vec![],
            new_commit: None,
        };
        let output = JsonRenderer.render(&report);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["summary"]["applied"], 1);
        assert_eq!(parsed["files"][0]["path"], "a.txt");
        assert_eq!(parsed["files"][0]["status"], "added");
    }
}
