//! Per-file reconcile outcomes and the aggregate run result.

use serde::Serialize;

use crate::patch::ConflictReason;

/// The result of reconciling a single changed file against the target
/// branch. Created once per file, consumed exactly once by the decision
/// engine, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The patch applied cleanly; `new_content` is the merged text.
    Applied { path: String, new_content: String },
    /// The source commit removed this file; nothing to apply.
    Skipped { path: String },
    /// The patch was rejected; the record carries everything needed to
    /// report and persist the conflict.
    Conflicted(ConflictRecord),
}

impl ReconcileOutcome {
    pub fn path(&self) -> &str {
        match self {
            ReconcileOutcome::Applied { path, .. } => path,
            ReconcileOutcome::Skipped { path } => path,
            ReconcileOutcome::Conflicted(record) => &record.path,
        }
    }
}

/// A rejected patch, with the inputs kept around so the artifact writer
/// can persist them without re-fetching anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub path: String,
    pub reason: ConflictReason,
    /// Base text the patch was applied against. Not serialized into
    /// reports; only the artifact writer reads it.
    #[serde(skip)]
    pub base: String,
    /// Raw patch text as received from the API.
    #[serde(skip)]
    pub patch: String,
}

/// A file whose patched content is ready to become a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFile {
    pub path: String,
    pub content: String,
}

/// Counts of per-file outcomes for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub applied: usize,
    pub skipped: usize,
    pub conflicted: usize,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[ReconcileOutcome]) -> Self {
        let mut summary = Summary::default();
        for outcome in outcomes {
            match outcome {
                ReconcileOutcome::Applied { .. } => summary.applied += 1,
                ReconcileOutcome::Skipped { .. } => summary.skipped += 1,
                ReconcileOutcome::Conflicted(_) => summary.conflicted += 1,
            }
        }
        summary
    }
}

/// Why a run stopped short of committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// One or more files conflicted; nothing was committed.
    Conflicts(Vec<ConflictRecord>),
    /// The run was cancelled cooperatively between files.
    Cancelled,
}

/// Aggregate decision for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// Preview mode: a full summary, conflicts included, no mutation.
    Preview {
        summary: Summary,
        conflicts: Vec<ConflictRecord>,
    },
    /// Commit mode stopped before creating anything.
    Aborted(AbortReason),
    /// Commit mode found nothing to commit (everything skipped, or the
    /// changed-file list was empty).
    NoOp,
    /// Commit mode may proceed: every file applied cleanly.
    ReadyToCommit { applied: Vec<AppliedFile> },
}
