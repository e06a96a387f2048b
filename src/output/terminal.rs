//! Terminal renderer: styled flowing text, one line per file.

use std::collections::HashSet;

use colored::Colorize;

use crate::models::{FileStatus, RunMode, RunReport};
use crate::output::ReportRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl ReportRenderer for TerminalRenderer {
    fn render(&self, report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            " {} {} {} {} (head {})\n\n",
            report.mode.to_string().bold(),
            short_sha(&report.source).bold(),
            "→".dimmed(),
            report.target.bold(),
            short_sha(&report.target_head),
        ));

        if report.files.is_empty() {
            output.push_str(&format!("{}", "  Source commit changed no files.\n".dimmed()));
            return output;
        }

        let conflicted: HashSet<&str> =
            report.conflicts.iter().map(|c| c.path.as_str()).collect();

        for file in &report.files {
            let marker = if conflicted.contains(file.path.as_str()) {
                "✖".red().bold().to_string()
            } else if file.status == FileStatus::Removed {
                "−".dimmed().to_string()
            } else {
                "✔".green().to_string()
            };
            output.push_str(&format!(
                " {} {:<9} {}  {} {}  {}\n",
                marker,
                file.status.to_string().cyan(),
                file.path.bold(),
                format!("+{}", file.additions).green(),
                format!("-{}", file.deletions).red(),
                format!("({} patch lines)", file.patch_lines).dimmed(),
            ));
        }

        if !report.conflicts.is_empty() {
            output.push('\n');
            for conflict in &report.conflicts {
                output.push_str(&format!(
                    " {} {} — {}\n",
                    "✖".red().bold(),
                    conflict.path.bold(),
                    conflict.reason,
                ));
            }
        }

        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} file(s): {} applied, {} skipped, {} conflicted\n",
            report.files.len().to_string().bold(),
            report.summary.applied.to_string().green().bold(),
            report.summary.skipped,
            report.summary.conflicted.to_string().red().bold(),
        ));

        match (report.mode, &report.new_commit) {
            (RunMode::Commit, Some(sha)) => {
                output.push_str(&format!(
                    " {} New commit on {}: {}\n",
                    "✔".green().bold(),
                    report.target.bold(),
                    sha,
                ));
            }
            (RunMode::Preview, _) if report.summary.conflicted == 0 => {
                output.push_str(&format!(
                    "{}",
                    " Re-run with --commit to apply.\n".dimmed(),
                ));
            }
            (RunMode::Preview, _) => {
                output.push_str(&format!(
                    "{}",
                    " Conflicted files must be reconciled upstream before this commit can be applied.\n"
                        .dimmed(),
                ));
            }
            _ => {}
        }

        output
    }
}

/// Abbreviate an object SHA for display.
fn short_sha(sha: &str) -> &str {
    if sha.len() >= 7 { &sha[..7] } else { sha }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictRecord, FileReport, Summary};
    use crate::patch::ConflictReason;

    fn sample_report(conflicted: bool) -> RunReport {
        let mut conflicts = Vec::new();
        if conflicted {
            conflicts.push(ConflictRecord {
                path: "src/broken.rs".into(),
                reason: ConflictReason::HunkMismatch { hunk: 1, line: 4 },
                base: String::new(),
                patch: String::new(),
            });
        }
        RunReport {
            mode: RunMode::Preview,
            source: "abc1234def".into(),
            target: "main".into(),
            target_head: "9876543abc".into(),
            files: vec![
                FileReport {
                    path: "src/lib.rs".into(),
                    status: FileStatus::Modified,
                    additions: 3,
                    deletions: 1,
                    patch_lines: 12,
                },
                FileReport {
                    path: "src/broken.rs".into(),
                    status: FileStatus::Modified,
                    additions: 1,
                    deletions: 1,
                    patch_lines: 4,
                },
            ],
            summary: Summary {
                applied: if conflicted { 1 } else { 2 },
                skipped: 0,
                conflicted: usize::from(conflicted),
            },
            conflicts,
            new_commit: None,
        }
    }

    #[test]
    fn render_lists_files_and_summary() {
        let output = TerminalRenderer.render(&sample_report(false));
        assert!(output.contains("src/lib.rs"));
        assert!(output.contains("2 applied"));
        assert!(output.contains("Re-run with --commit"));
    }

    #[test]
    fn render_shows_conflict_reasons() {
        let output = TerminalRenderer.render(&sample_report(true));
        assert!(output.contains("src/broken.rs"));
        assert!(output.contains("hunk #1"));
        assert!(output.contains("1 conflicted"));
        assert!(!output.contains("Re-run with --commit"));
    }

    #[test]
    fn render_commit_mode_shows_new_sha() {
        let mut report = sample_report(false);
        report.mode = RunMode::Commit;
        report.new_commit = Some("fedcba9".into());
        let output = TerminalRenderer.render(&report);
        assert!(output.contains("fedcba9"));
    }

    #[test]
    fn render_empty_file_list() {
        let mut report = sample_report(false);
        report.files.clear();
        report.summary = Summary::default();
        let output = TerminalRenderer.render(&report);
        assert!(output.contains("no files"));
    }

    #[test]
    fn short_sha_abbreviates() {
        assert_eq!(short_sha("abcdef0123456789"), "abcdef0");
        assert_eq!(short_sha("abc"), "abc");
    }
}
