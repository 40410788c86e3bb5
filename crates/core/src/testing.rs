//! In-memory contents store used by the command object tests

use crate::config::ClientConfig;
use crate::contents::{CommitInfo, Contents, ContentsApi, EntryKind, FileCommit, RemoteFileRecord};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    files: BTreeMap<String, (String, Vec<u8>)>,
    dirs: BTreeSet<String>,
    next_sha: u64,
    requests: Vec<String>,
}

pub(crate) struct FakeContents {
    config: ClientConfig,
    state: Mutex<State>,
    rejected: Vec<String>,
}

impl FakeContents {
    pub(crate) fn new() -> Self {
        Self {
            config: ClientConfig::new("acme", "pics", "ghp_test", "main"),
            state: Mutex::new(State::default()),
            rejected: Vec::new(),
        }
    }

    /// Writes to paths starting with `prefix` answer 422
    pub(crate) fn rejecting(mut self, prefix: &str) -> Self {
        self.rejected.push(prefix.to_string());
        self
    }

    pub(crate) fn with_file(self, path: &str, bytes: &[u8]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_sha += 1;
            let sha = format!("sha-{}", state.next_sha);
            state.files.insert(path.to_string(), (sha, bytes.to_vec()));
        }
        self
    }

    pub(crate) fn with_dir(self, path: &str) -> Self {
        self.state.lock().unwrap().dirs.insert(path.to_string());
        self
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|(_, bytes)| bytes.clone())
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    /// `METHOD path` for every call, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    fn record(&self, path: &str, sha: &str, size: u64, kind: EntryKind) -> RemoteFileRecord {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let download_url = (kind == EntryKind::File).then(|| self.config.raw_url(path));
        RemoteFileRecord {
            name,
            path: path.to_string(),
            sha: sha.to_string(),
            size,
            kind,
            url: None,
            html_url: None,
            git_url: None,
            download_url,
        }
    }
}

fn not_found(path: &str) -> Error {
    Error::NotFound(path.to_string())
}

#[async_trait]
impl ContentsApi for FakeContents {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_contents(&self, path: &str) -> Result<Contents> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("GET {}", path));

        if let Some((sha, bytes)) = state.files.get(path) {
            return Ok(Contents::Single(self.record(path, sha, bytes.len() as u64, EntryKind::File)));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut children = BTreeMap::new();
        for (file_path, (sha, bytes)) in &state.files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let dir_path = format!("{}{}", prefix, dir);
                    children
                        .entry(dir_path.clone())
                        .or_insert_with(|| self.record(&dir_path, "tree", 0, EntryKind::Dir));
                }
                None => {
                    children.insert(
                        file_path.clone(),
                        self.record(file_path, sha, bytes.len() as u64, EntryKind::File),
                    );
                }
            }
        }

        if children.is_empty() && !path.is_empty() && !state.dirs.contains(path) {
            return Err(not_found(path));
        }

        Ok(Contents::Listing(children.into_values().collect()))
    }

    async fn put_file(&self, path: &str, content: &str, message: &str) -> Result<FileCommit> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("PUT {}", path));

        if self.rejected.iter().any(|p| path.starts_with(p.as_str())) || state.files.contains_key(path) {
            return Err(Error::GitHubApi {
                status: 422,
                message: "Invalid request.\n\n\"sha\" wasn't supplied.".to_string(),
            });
        }

        let bytes = STANDARD
            .decode(content)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        state.next_sha += 1;
        let sha = format!("sha-{}", state.next_sha);
        let size = bytes.len() as u64;
        state.files.insert(path.to_string(), (sha.clone(), bytes));

        Ok(FileCommit {
            content: self.record(path, &sha, size, EntryKind::File),
            commit: CommitInfo {
                sha: format!("commit-{}", sha),
                message: Some(message.to_string()),
                html_url: None,
            },
        })
    }

    async fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<CommitInfo> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("DELETE {}", path));

        let current = state
            .files
            .get(path)
            .map(|(current, _)| current.clone())
            .ok_or_else(|| not_found(path))?;

        if current != sha {
            return Err(Error::GitHubApi {
                status: 409,
                message: format!("{} does not match {}", path, sha),
            });
        }

        state.files.remove(path);

        Ok(CommitInfo {
            sha: format!("commit-delete-{}", sha),
            message: Some(message.to_string()),
            html_url: None,
        })
    }
}
