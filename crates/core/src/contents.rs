//! Contents API model and the trait the command objects are written against

use crate::config::ClientConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Host serving raw file contents
pub const RAW_HOST: &str = "raw.githubusercontent.com";

/// jsDelivr mirror of GitHub repositories
pub const CDN_HOST: &str = "cdn.jsdelivr.net";

/// Path-addressed read/write/delete of repository objects
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Repository the client is bound to
    fn config(&self) -> &ClientConfig;

    /// Read one object or a directory listing, pinned to the configured branch
    async fn get_contents(&self, path: &str) -> Result<Contents>;

    /// Create or update an object; `content` is already base64-encoded
    async fn put_file(&self, path: &str, content: &str, message: &str) -> Result<FileCommit>;

    /// Delete an object whose current sha is `sha`
    async fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<CommitInfo>;
}

/// Object type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Unknown,
}

/// One repository object as described by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFileRecord {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl RemoteFileRecord {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A read answer: an array for directories, an object otherwise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Listing(Vec<RemoteFileRecord>),
    Single(RemoteFileRecord),
}

/// Commit created by a write or delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Answer to a create/update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCommit {
    pub content: RemoteFileRecord,
    pub commit: CommitInfo,
}

/// Body of a create/update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub message: String,
    pub content: String,
    pub branch: String,
}

/// Body of a delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub message: String,
    pub sha: String,
    pub branch: String,
}
