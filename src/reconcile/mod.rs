//! File reconciliation: applies each changed file's patch against the
//! target branch's current content.
//!
//! Base content arrives through the injected [`BaseFetcher`] capability,
//! so the core never knows how content is retrieved and tests can run
//! against an in-memory stub. Work fans out across a bounded worker
//! pool; the output order always equals the input order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{ChangedFile, ConflictRecord, FileStatus, ReconcileOutcome};
use crate::patch;

/// Capability for reading a file's current text on the target branch.
///
/// `Ok(None)` means the path does not exist there — the file reconciles
/// against the empty string. `Err` is reserved for genuine transport
/// failure, which is fatal to the whole run; implementations must never
/// report absence as an error.
#[async_trait]
pub trait BaseFetcher: Send + Sync {
    async fn fetch_base(&self, path: &str) -> Result<Option<String>, FetchError>;
}

/// A transport failure while fetching base content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("fetching base content for {path} failed: {detail}")]
pub struct FetchError {
    pub path: String,
    pub detail: String,
}

/// Fatal conditions during reconciliation. A single file's conflict is
/// never one of these; conflicts flow through [`ReconcileOutcome`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("run cancelled")]
    Cancelled,

    #[error("reconcile worker failed: {0}")]
    Worker(String),
}

/// Shared cooperative cancellation flag, checked between files.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reconcile every changed file of the source commit, in input order.
///
/// Removed files short-circuit to `Skipped` without touching the
/// fetcher or the applier. Everything else fetches its base (bounded by
/// `max_concurrent` permits) and runs the patch applier; results are
/// re-seated by input index, so the ordering invariant holds no matter
/// how the workers interleave.
///
/// Cancellation is cooperative: the flag is checked before each
/// dispatch, and a file whose fetch has started runs to completion
/// before the cancelled run returns.
pub async fn reconcile(
    files: &[ChangedFile],
    fetcher: Arc<dyn BaseFetcher>,
    max_concurrent: usize,
    cancel: &CancelFlag,
) -> Result<Vec<ReconcileOutcome>, ReconcileError> {
    let mut slots: Vec<Option<ReconcileOutcome>> = Vec::new();
    slots.resize_with(files.len(), || None);

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut join_set: JoinSet<Result<(usize, ReconcileOutcome), FetchError>> = JoinSet::new();

    let mut cancelled = false;
    for (index, file) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        if file.status == FileStatus::Removed {
            slots[index] = Some(ReconcileOutcome::Skipped { path: file.path.clone() });
            continue;
        }

        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        let file = file.clone();
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let base = fetcher.fetch_base(&file.path).await?.unwrap_or_default();
            let outcome = match patch::apply(&base, file.patch.as_deref()) {
                Ok(new_content) => ReconcileOutcome::Applied { path: file.path.clone(), new_content },
                Err(reason) => ReconcileOutcome::Conflicted(ConflictRecord {
                    path: file.path.clone(),
                    reason,
                    base,
                    patch: file.patch.clone().unwrap_or_default(),
                }),
            };
            Ok((index, outcome))
        });
    }

    // In-flight files run to completion even on a cancelled run; their
    // results are simply discarded.
    let mut first_error: Option<ReconcileError> = None;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok((index, outcome))) => slots[index] = Some(outcome),
            Ok(Err(fetch)) => {
                if first_error.is_none() {
                    first_error = Some(ReconcileError::Fetch(fetch));
                }
            }
            Err(join) => {
                if first_error.is_none() {
                    first_error = Some(ReconcileError::Worker(join.to_string()));
                }
            }
        }
    }

    if cancelled {
        return Err(ReconcileError::Cancelled);
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{sleep, Duration};

    /// In-memory fetcher with per-call bookkeeping.
    struct StubFetcher {
        contents: HashMap<String, String>,
        calls: AtomicUsize,
        /// Delay applied to the first file fetched, to scramble
        /// completion order.
        stagger: Option<String>,
        fail_path: Option<String>,
    }

    impl StubFetcher {
        fn new(contents: &[(&str, &str)]) -> Self {
            Self {
                contents: contents
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
                stagger: None,
                fail_path: None,
            }
        }
    }

    #[async_trait]
    impl BaseFetcher for StubFetcher {
        async fn fetch_base(&self, path: &str) -> Result<Option<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stagger.as_deref() == Some(path) {
                sleep(Duration::from_millis(50)).await;
            }
            if self.fail_path.as_deref() == Some(path) {
                return Err(FetchError {
                    path: path.to_string(),
                    detail: "connection reset".to_string(),
                });
            }
            Ok(self.contents.get(path).cloned())
        }
    }

    fn changed(path: &str, status: FileStatus, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status,
            additions: 0,
            deletions: 0,
            patch: patch.map(String::from),
            previous_filename: None,
        }
    }

    #[tokio::test]
    async fn applies_skips_and_conflicts() {
        let files = vec![
            changed("ok.txt", FileStatus::Modified, Some("@@ -1 +1 @@\n-a\n+b")),
            changed("gone.txt", FileStatus::Removed, None),
            changed("bad.txt", FileStatus::Modified, Some("@@ -1 +1 @@\n-x\n+y")),
        ];
        let fetcher = Arc::new(StubFetcher::new(&[("ok.txt", "a\n"), ("bad.txt", "diverged\n")]));
        let outcomes = reconcile(&files, fetcher, 4, &CancelFlag::new()).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(&outcomes[0], ReconcileOutcome::Applied { path, new_content }
            if path == "ok.txt" && new_content == "b\n"));
        assert!(matches!(&outcomes[1], ReconcileOutcome::Skipped { path } if path == "gone.txt"));
        assert!(matches!(&outcomes[2], ReconcileOutcome::Conflicted(record)
            if record.path == "bad.txt"));
    }

    #[tokio::test]
    async fn output_order_matches_input_despite_concurrency() {
        // First file sleeps in the fetcher; with 4 permits the others
        // complete first, and the result order must still be a, b, c.
        let files = vec![
            changed("a.txt", FileStatus::Modified, None),
            changed("b.txt", FileStatus::Modified, None),
            changed("c.txt", FileStatus::Modified, None),
        ];
        let mut stub = StubFetcher::new(&[("a.txt", "a\n"), ("b.txt", "b\n"), ("c.txt", "c\n")]);
        stub.stagger = Some("a.txt".to_string());
        let outcomes = reconcile(&files, Arc::new(stub), 4, &CancelFlag::new()).await.unwrap();

        let paths: Vec<_> = outcomes.iter().map(|o| o.path().to_string()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn removed_files_never_touch_the_fetcher() {
        let files = vec![
            changed("one.txt", FileStatus::Removed, None),
            changed("two.txt", FileStatus::Removed, None),
        ];
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let outcomes = reconcile(&files, Arc::clone(&fetcher) as Arc<dyn BaseFetcher>, 4, &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn absent_base_reconciles_against_empty_string() {
        let files = vec![changed(
            "new.txt",
            FileStatus::Added,
            Some("@@ -0,0 +1,1 @@\n+hello"),
        )];
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let outcomes = reconcile(&files, fetcher, 1, &CancelFlag::new()).await.unwrap();
        assert!(matches!(&outcomes[0], ReconcileOutcome::Applied { new_content, .. }
            if new_content == "hello\n"));
    }

    #[tokio::test]
    async fn transport_failure_is_fatal() {
        let files = vec![
            changed("fine.txt", FileStatus::Modified, None),
            changed("broken.txt", FileStatus::Modified, None),
        ];
        let mut stub = StubFetcher::new(&[("fine.txt", "x\n")]);
        stub.fail_path = Some("broken.txt".to_string());
        let err = reconcile(&files, Arc::new(stub), 4, &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Fetch(ref fetch) if fetch.path == "broken.txt"));
    }

    #[tokio::test]
    async fn cancelled_flag_stops_dispatch() {
        let files = vec![
            changed("a.txt", FileStatus::Modified, None),
            changed("b.txt", FileStatus::Modified, None),
        ];
        let cancel = CancelFlag::new();
        cancel.cancel();
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let err = reconcile(&files, Arc::clone(&fetcher) as Arc<dyn BaseFetcher>, 4, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Cancelled));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conflict_record_carries_base_and_patch() {
        let patch_text = "@@ -1 +1 @@\n-expected\n+changed";
        let files = vec![changed("f.txt", FileStatus::Modified, Some(patch_text))];
        let fetcher = Arc::new(StubFetcher::new(&[("f.txt", "actual\n")]));
        let outcomes = reconcile(&files, fetcher, 1, &CancelFlag::new()).await.unwrap();
        match &outcomes[0] {
            ReconcileOutcome::Conflicted(record) => {
                assert_eq!(record.base, "actual\n");
                assert_eq!(record.patch, patch_text);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_file_list_yields_empty_outcomes() {
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let outcomes = reconcile(&[], fetcher, 4, &CancelFlag::new()).await.unwrap();
        assert!(outcomes.is_empty());
    }
}
