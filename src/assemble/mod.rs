//! Commit assembly: turns applied files into blobs, a tree, a commit,
//! and a ref update on the target branch.
//!
//! Invoked only in commit mode, only on `RunResult::ReadyToCommit`.
//! By the time this runs the all-or-nothing decision has already been
//! made; any API failure here aborts the run with nothing retried.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::github::{ApiError, GitHubClient, TreeEntry};
use crate::models::AppliedFile;

/// Everything known about the target branch at the start of the run.
#[derive(Debug, Clone)]
pub struct TargetBranch {
    pub name: String,
    /// Head commit SHA, read once; the final non-forcing ref update is
    /// what detects a branch that moved since.
    pub head: String,
    /// Tree SHA of the head commit, used as `base_tree`.
    pub tree: String,
}

/// Builds the new commit through the GitHub object APIs.
pub struct CommitAssembler {
    client: Arc<GitHubClient>,
    max_concurrent: usize,
}

impl CommitAssembler {
    pub fn new(client: Arc<GitHubClient>, max_concurrent: usize) -> Self {
        Self { client, max_concurrent }
    }

    /// Create one blob per applied file, a tree on top of the target
    /// head's tree, and a commit with the target head as sole parent,
    /// then advance the branch ref. Returns the new commit SHA.
    pub async fn assemble(
        &self,
        applied: &[AppliedFile],
        target: &TargetBranch,
        message: &str,
    ) -> Result<String, ApiError> {
        let entries = self.create_blobs(applied).await?;
        let tree = self.client.create_tree(&target.tree, &entries).await?;
        let commit = self
            .client
            .create_commit(message, &tree, std::slice::from_ref(&target.head))
            .await?;
        self.client.update_ref(&target.name, &commit).await?;
        Ok(commit)
    }

    /// Reuse an existing tree verbatim as a new commit on the target
    /// head (the `graft` subcommand's fast path; no blobs involved).
    pub async fn graft(
        &self,
        tree: &str,
        branch: &str,
        head: &str,
        message: &str,
    ) -> Result<String, ApiError> {
        let parents = [head.to_string()];
        let commit = self.client.create_commit(message, tree, &parents).await?;
        self.client.update_ref(branch, &commit).await?;
        Ok(commit)
    }

    /// Blob creation fans out like base fetching does; entries are
    /// re-seated by index so the tree preserves applied-file order.
    async fn create_blobs(&self, applied: &[AppliedFile]) -> Result<Vec<TreeEntry>, ApiError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        let mut join_set: JoinSet<Result<(usize, TreeEntry), ApiError>> = JoinSet::new();

        for (index, file) in applied.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let path = file.path.clone();
            let content = file.content.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let sha = client.create_blob(&content).await?;
                Ok((index, TreeEntry { path, sha }))
            });
        }

        let mut slots: Vec<Option<TreeEntry>> = Vec::new();
        slots.resize_with(applied.len(), || None);
        let mut first_error: Option<ApiError> = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok((index, entry))) => slots[index] = Some(entry),
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(join) => {
                    if first_error.is_none() {
                        first_error = Some(ApiError::transport("create blob", join));
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

/// Commit message recorded on the target branch.
pub fn cherry_pick_message(source_message: &str) -> String {
    format!("Cherry-pick: {source_message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_prefixes_source_message() {
        assert_eq!(
            cherry_pick_message("Fix the frobnicator"),
            "Cherry-pick: Fix the frobnicator",
        );
    }

    #[test]
    fn message_keeps_multiline_bodies() {
        let message = cherry_pick_message("Subject\n\nBody paragraph.");
        assert_eq!(message, "Cherry-pick: Subject\n\nBody paragraph.");
    }
}
