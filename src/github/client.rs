//! Thin async client for the handful of GitHub endpoints this tool uses.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::types::{CommitObject, SourceCommit, TreeEntry};
use super::ApiError;
use crate::constants::USER_AGENT;
use crate::reconcile::{BaseFetcher, FetchError};

/// Client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Deserialize)]
struct ShaPayload {
    sha: String,
}

#[derive(Deserialize)]
struct RefPayload {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, owner: &str, repo: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        }
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{tail}", self.api_url, self.owner, self.repo)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn execute(&self, operation: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        builder
            .send()
            .await
            .map_err(|e| ApiError::transport(operation, e))
    }

    async fn ensure_success(operation: &str, resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        Err(ApiError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            detail: error_detail(resp).await,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        operation: &str,
        resp: Response,
    ) -> Result<T, ApiError> {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::decode(operation, e.to_string()))
    }

    /// The source commit's metadata and changed-file list.
    pub async fn source_commit(&self, commit_ref: &str) -> Result<SourceCommit, ApiError> {
        let operation = format!("get commit {commit_ref}");
        let url = self.repo_url(&format!("commits/{commit_ref}"));
        let resp = self.execute(&operation, self.request(Method::GET, url)).await?;
        let resp = Self::ensure_success(&operation, resp).await?;
        Self::json(&operation, resp).await
    }

    /// Current head SHA of a branch.
    pub async fn branch_head(&self, branch: &str) -> Result<String, ApiError> {
        let operation = format!("get ref heads/{branch}");
        let url = self.repo_url(&format!("git/ref/heads/{branch}"));
        let resp = self.execute(&operation, self.request(Method::GET, url)).await?;
        let resp = Self::ensure_success(&operation, resp).await?;
        let payload: RefPayload = Self::json(&operation, resp).await?;
        Ok(payload.object.sha)
    }

    /// A commit object (message and tree SHA).
    pub async fn commit_object(&self, sha: &str) -> Result<CommitObject, ApiError> {
        let operation = format!("get git commit {sha}");
        let url = self.repo_url(&format!("git/commits/{sha}"));
        let resp = self.execute(&operation, self.request(Method::GET, url)).await?;
        let resp = Self::ensure_success(&operation, resp).await?;
        Self::json(&operation, resp).await
    }

    /// A file's text on a branch, or `None` when the path does not
    /// exist there. Only HTTP 404 counts as absence; any other failure
    /// propagates.
    pub async fn file_content(
        &self,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>, ApiError> {
        let operation = format!("get contents of {path}");
        let url = self.repo_url(&format!("contents/{path}"));
        let builder = self.request(Method::GET, url).query(&[("ref", reference)]);
        let resp = self.execute(&operation, builder).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::ensure_success(&operation, resp).await?;
        let payload: serde_json::Value = Self::json(&operation, resp).await?;
        parse_contents_payload(&payload)
            .map(Some)
            .map_err(|detail| ApiError::decode(&operation, detail))
    }

    /// Create a blob; returns its SHA.
    pub async fn create_blob(&self, content: &str) -> Result<String, ApiError> {
        let operation = "create blob";
        let url = self.repo_url("git/blobs");
        let body = json!({ "content": content, "encoding": "utf-8" });
        let resp = self
            .execute(operation, self.request(Method::POST, url).json(&body))
            .await?;
        let resp = Self::ensure_success(operation, resp).await?;
        let payload: ShaPayload = Self::json(operation, resp).await?;
        Ok(payload.sha)
    }

    /// Create a tree on top of `base_tree`; returns its SHA.
    pub async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ApiError> {
        let operation = "create tree";
        let url = self.repo_url("git/trees");
        let tree: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "path": entry.path,
                    "mode": "100644",
                    "type": "blob",
                    "sha": entry.sha,
                })
            })
            .collect();
        let body = json!({ "base_tree": base_tree, "tree": tree });
        let resp = self
            .execute(operation, self.request(Method::POST, url).json(&body))
            .await?;
        let resp = Self::ensure_success(operation, resp).await?;
        let payload: ShaPayload = Self::json(operation, resp).await?;
        Ok(payload.sha)
    }

    /// Create a commit; returns its SHA.
    pub async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, ApiError> {
        let operation = "create commit";
        let url = self.repo_url("git/commits");
        let body = json!({ "message": message, "tree": tree, "parents": parents });
        let resp = self
            .execute(operation, self.request(Method::POST, url).json(&body))
            .await?;
        let resp = Self::ensure_success(operation, resp).await?;
        let payload: ShaPayload = Self::json(operation, resp).await?;
        Ok(payload.sha)
    }

    /// Advance a branch ref to `sha`, non-forcing. A rejection means
    /// the branch moved since the run read its head.
    pub async fn update_ref(&self, branch: &str, sha: &str) -> Result<(), ApiError> {
        let operation = format!("update ref heads/{branch}");
        let url = self.repo_url(&format!("git/refs/heads/{branch}"));
        let body = json!({ "sha": sha, "force": false });
        let resp = self
            .execute(&operation, self.request(Method::PATCH, url).json(&body))
            .await?;
        if is_ref_conflict(resp.status()) {
            return Err(ApiError::RefMoved);
        }
        Self::ensure_success(&operation, resp).await?;
        Ok(())
    }
}

/// Non-forcing ref updates are rejected with 422 (fast-forward
/// impossible) or 409 (conflicting concurrent update).
fn is_ref_conflict(status: StatusCode) -> bool {
    status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::CONFLICT
}

/// Extract the decoded text from a contents-API payload.
fn parse_contents_payload(payload: &serde_json::Value) -> Result<String, String> {
    if payload.is_array() {
        return Err("path is a directory, not a file".to_string());
    }
    let encoding = payload
        .get("encoding")
        .and_then(|e| e.as_str())
        .unwrap_or_default();
    if encoding != "base64" {
        // The API reports `"encoding": "none"` for blobs over its size
        // cutoff; there is no text to reconcile against.
        return Err(format!("unsupported content encoding {encoding:?}"));
    }
    let raw = payload
        .get("content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| "missing content field".to_string())?;
    decode_base64_content(raw)
}

/// Decode base64 text as the contents API serves it: wrapped with
/// embedded newlines.
fn decode_base64_content(raw: &str) -> Result<String, String> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| format!("invalid base64 content: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("content is not valid UTF-8: {e}"))
}

async fn error_detail(resp: Response) -> String {
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("no error message")
            .to_string(),
        Err(_) => "no error message".to_string(),
    }
}

/// Adapts [`GitHubClient`] to the core's [`BaseFetcher`] capability for
/// one target branch.
pub struct BranchBaseFetcher {
    client: Arc<GitHubClient>,
    branch: String,
}

impl BranchBaseFetcher {
    pub fn new(client: Arc<GitHubClient>, branch: impl Into<String>) -> Self {
        Self { client, branch: branch.into() }
    }
}

#[async_trait]
impl BaseFetcher for BranchBaseFetcher {
    async fn fetch_base(&self, path: &str) -> Result<Option<String>, FetchError> {
        self.client
            .file_content(path, &self.branch)
            .await
            .map_err(|e| FetchError { path: path.to_string(), detail: e.to_string() })
    }
}
