//! Upload local files into the repository

use crate::contents::ContentsApi;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Remote directory used when none is given
pub const DEFAULT_REMOTE_DIR: &str = "images";

/// A completed upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Repository-relative path
    pub path: String,
    pub download_url: String,
    pub cdn_url: String,
    /// Version identifier of the new object
    pub sha: String,
    pub size: u64,
}

/// Uploads local files through a contents API
pub struct Uploader<C> {
    api: C,
}

impl<C: ContentsApi> Uploader<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// Upload one file and describe the created object
    pub async fn upload_file(
        &self,
        local_path: &Path,
        remote_dir: Option<&str>,
        custom_name: Option<&str>,
    ) -> Result<UploadedFile> {
        if !local_path.is_file() {
            return Err(Error::FileNotFound(local_path.to_path_buf()));
        }

        let name = match custom_name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => generated_file_name(local_path, chrono::Utc::now().timestamp_millis()),
        };
        let target = remote_path(remote_dir, &name);

        let bytes = tokio::fs::read(local_path).await?;
        let encoded = STANDARD.encode(&bytes);

        let commit = self
            .api
            .put_file(&target, &encoded, &format!("Upload {}", name))
            .await?;

        let config = self.api.config();
        let download_url = commit
            .content
            .download_url
            .clone()
            .unwrap_or_else(|| config.raw_url(&target));

        tracing::info!(path = %target, size = bytes.len(), "uploaded");

        Ok(UploadedFile {
            cdn_url: config.cdn_url(&target),
            path: target,
            download_url,
            sha: commit.content.sha,
            size: bytes.len() as u64,
        })
    }

    /// Upload one file and return its download URL
    pub async fn upload_one(
        &self,
        local_path: &Path,
        remote_dir: Option<&str>,
        custom_name: Option<&str>,
    ) -> Result<String> {
        self.upload_file(local_path, remote_dir, custom_name)
            .await
            .map(|uploaded| uploaded.download_url)
    }

    /// Upload files one after another.
    ///
    /// The result has one entry per input, in input order. A failed upload
    /// is logged and leaves an empty string at its index.
    pub async fn upload_many<P: AsRef<Path>>(
        &self,
        local_paths: &[P],
        remote_dir: Option<&str>,
    ) -> Vec<String> {
        let mut urls = Vec::with_capacity(local_paths.len());

        for local_path in local_paths {
            let local_path = local_path.as_ref();
            match self.upload_one(local_path, remote_dir, None).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::error!(file = %local_path.display(), error = %e, "upload failed");
                    urls.push(String::new());
                }
            }
        }

        urls
    }
}

/// `<stem>-<millis><.ext>` for the file name of `local_path`
pub fn generated_file_name(local_path: &Path, millis: i64) -> String {
    let stem = local_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    match local_path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, millis, ext.to_string_lossy()),
        None => format!("{}-{}", stem, millis),
    }
}

/// Repository path of `name` under `remote_dir` (default `images`)
pub fn remote_path(remote_dir: Option<&str>, name: &str) -> String {
    let dir = remote_dir.unwrap_or(DEFAULT_REMOTE_DIR).trim_matches('/');

    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
