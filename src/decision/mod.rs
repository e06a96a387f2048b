//! The all-or-nothing apply decision.
//!
//! A pure reduction over per-file outcomes; performs no I/O and never
//! talks to the API, so it is trivially unit-testable against synthetic
//! outcome lists.

use crate::models::{
    AbortReason, AppliedFile, ConflictRecord, ReconcileOutcome, RunMode, RunResult, Summary,
};

/// Aggregate per-file outcomes into a single run decision.
///
/// Preview always summarizes and never aborts. Commit aborts on any
/// conflict (no partial commit is ever created), degenerates to `NoOp`
/// when nothing applied, and otherwise hands the applied files —
/// in outcome order — to the commit assembler.
pub fn decide(outcomes: Vec<ReconcileOutcome>, mode: RunMode) -> RunResult {
    let summary = Summary::from_outcomes(&outcomes);

    match mode {
        RunMode::Preview => RunResult::Preview {
            summary,
            conflicts: collect_conflicts(outcomes),
        },
        RunMode::Commit => {
            if summary.conflicted > 0 {
                return RunResult::Aborted(AbortReason::Conflicts(collect_conflicts(outcomes)));
            }
            if summary.applied == 0 {
                return RunResult::NoOp;
            }
            let applied = outcomes
                .into_iter()
                .filter_map(|outcome| match outcome {
                    ReconcileOutcome::Applied { path, new_content } => {
                        Some(AppliedFile { path, content: new_content })
                    }
                    _ => None,
                })
                .collect();
            RunResult::ReadyToCommit { applied }
        }
    }
}

fn collect_conflicts(outcomes: Vec<ReconcileOutcome>) -> Vec<ConflictRecord> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            ReconcileOutcome::Conflicted(record) => Some(record),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ConflictReason;
    use pretty_assertions::assert_eq;

    fn applied(path: &str) -> ReconcileOutcome {
        ReconcileOutcome::Applied {
            path: path.into(),
            new_content: format!("{path} content\n"),
        }
    }

    fn skipped(path: &str) -> ReconcileOutcome {
        ReconcileOutcome::Skipped { path: path.into() }
    }

    fn conflicted(path: &str) -> ReconcileOutcome {
        ReconcileOutcome::Conflicted(ConflictRecord {
            path: path.into(),
            reason: ConflictReason::HunkMismatch { hunk: 1, line: 1 },
            base: String::new(),
            patch: String::new(),
        })
    }

    #[test]
    fn commit_aborts_on_any_conflict() {
        let outcomes = vec![applied("a"), conflicted("b"), skipped("c")];
        match decide(outcomes, RunMode::Commit) {
            RunResult::Aborted(AbortReason::Conflicts(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].path, "b");
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn commit_with_only_skips_is_noop() {
        let outcomes = vec![skipped("a"), skipped("b")];
        assert_eq!(decide(outcomes, RunMode::Commit), RunResult::NoOp);
    }

    #[test]
    fn commit_with_empty_list_is_noop() {
        assert_eq!(decide(vec![], RunMode::Commit), RunResult::NoOp);
    }

    #[test]
    fn commit_ready_preserves_outcome_order() {
        let outcomes = vec![applied("z"), skipped("m"), applied("a")];
        match decide(outcomes, RunMode::Commit) {
            RunResult::ReadyToCommit { applied } => {
                let paths: Vec<_> = applied.iter().map(|f| f.path.as_str()).collect();
                assert_eq!(paths, vec!["z", "a"]);
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn preview_summarizes_without_aborting() {
        let outcomes = vec![applied("a"), conflicted("b"), skipped("c")];
        match decide(outcomes, RunMode::Preview) {
            RunResult::Preview { summary, conflicts } => {
                assert_eq!(summary, Summary { applied: 1, skipped: 1, conflicted: 1 });
                assert_eq!(conflicts.len(), 1);
            }
            other => panic!("expected preview, got {other:?}"),
        }
    }

    #[test]
    fn preview_with_conflicts_is_never_aborted() {
        let outcomes = vec![conflicted("a"), conflicted("b")];
        assert!(matches!(
            decide(outcomes, RunMode::Preview),
            RunResult::Preview { .. },
        ));
    }
}
