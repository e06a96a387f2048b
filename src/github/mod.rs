//! GitHub REST API collaborator.
//!
//! Everything network-shaped lives here, behind narrow methods the core
//! calls through capability seams. Every failure is mapped into a
//! structured [`ApiError`] naming the remote operation, so the binary
//! can render a precise message without the core ever logging.

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::{BranchBaseFetcher, GitHubClient};
pub use types::{CommitObject, SourceCommit, TreeEntry};

/// Errors from GitHub API calls. All of these are fatal to a run.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, TLS, timeout, connection).
    #[error("request failed during {operation}: {detail}")]
    Transport { operation: String, detail: String },

    /// The API answered with a non-success status (auth, rate limit,
    /// missing object).
    #[error("GitHub returned HTTP {status} during {operation}: {detail}")]
    Api {
        operation: String,
        status: u16,
        detail: String,
    },

    /// The non-forcing ref update was rejected: the target branch moved
    /// while the run was in flight. Distinct from transport failure so
    /// callers can decide to re-run from scratch; never retried here.
    #[error("target branch moved during the run; re-run to pick up its new head")]
    RefMoved,

    /// The response body did not have the expected shape.
    #[error("unexpected response during {operation}: {detail}")]
    Decode { operation: String, detail: String },
}

impl ApiError {
    pub(crate) fn transport(operation: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Transport { operation: operation.to_string(), detail: err.to_string() }
    }

    pub(crate) fn decode(operation: &str, detail: impl Into<String>) -> Self {
        ApiError::Decode { operation: operation.to_string(), detail: detail.into() }
    }
}
