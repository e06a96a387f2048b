//! Typed slices of the GitHub REST payloads this tool reads and writes.

use serde::Deserialize;

use crate::models::ChangedFile;

/// The source commit to transplant: metadata plus its changed files,
/// from `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceCommit {
    pub sha: String,
    #[serde(rename = "commit", deserialize_with = "commit_message")]
    pub message: String,
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

/// A git commit object from `GET /repos/{owner}/{repo}/git/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitObject {
    pub sha: String,
    pub message: String,
    #[serde(rename = "tree", deserialize_with = "object_sha")]
    pub tree: String,
}

/// One blob entry for tree creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub sha: String,
}

/// Pull `message` out of the nested `commit` object.
fn commit_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Nested {
        message: String,
    }
    Ok(Nested::deserialize(deserializer)?.message)
}

/// Pull `sha` out of a nested `{ "sha": ... }` object.
fn object_sha<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Nested {
        sha: String,
    }
    Ok(Nested::deserialize(deserializer)?.sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_source_commit() {
        let json = r#"{
            "sha": "abc123",
            "commit": { "message": "Fix the frobnicator", "author": {"name": "x"} },
            "files": [
                { "filename": "src/frob.rs", "status": "modified",
                  "additions": 1, "deletions": 1,
                  "patch": "@@ -1 +1 @@\n-a\n+b" }
            ]
        }"#;
        let commit: SourceCommit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.message, "Fix the frobnicator");
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].path, "src/frob.rs");
    }

    #[test]
    fn deserialize_source_commit_without_files() {
        let json = r#"{"sha": "abc", "commit": {"message": "empty"}}"#;
        let commit: SourceCommit = serde_json::from_str(json).unwrap();
        assert!(commit.files.is_empty());
    }

    #[test]
    fn deserialize_commit_object() {
        let json = r#"{
            "sha": "def456",
            "message": "head commit",
            "tree": { "sha": "tree789", "url": "ignored" },
            "parents": [{ "sha": "aaa" }]
        }"#;
        let commit: CommitObject = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "def456");
        assert_eq!(commit.tree, "tree789");
    }
}
