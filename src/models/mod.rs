//! Shared types used across all modules.
//!
//! This module defines the core data structures for changed files,
//! reconcile outcomes, and run results. Other modules import from here
//! rather than reaching into each other's internals.

pub mod file;
pub mod outcome;
pub mod report;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use file::{ChangedFile, FileStatus};
pub use outcome::{
    AbortReason, AppliedFile, ConflictRecord, ReconcileOutcome, RunResult, Summary,
};
pub use report::{FileReport, RunReport};

/// Whether a run is allowed to mutate the remote repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunMode {
    /// Report what would happen; never create objects or move refs.
    Preview,
    /// Apply for real: all-or-nothing commit on the target branch.
    Commit,
}
