//! Directory listings and single-file metadata

use crate::contents::{Contents, ContentsApi, RemoteFileRecord};
use crate::error::Result;

/// Result of a list call
#[derive(Debug, Clone)]
pub enum Listing {
    /// The path named a single object
    File(RemoteFileRecord),
    /// The path named a directory; entries of other types are dropped
    Directory {
        path: String,
        directories: Vec<RemoteFileRecord>,
        files: Vec<RemoteFileRecord>,
    },
}

impl Listing {
    /// A directory with neither files nor subdirectories
    pub fn is_empty(&self) -> bool {
        match self {
            Listing::File(_) => false,
            Listing::Directory {
                directories, files, ..
            } => directories.is_empty() && files.is_empty(),
        }
    }
}

/// Lists repository paths through a contents API
pub struct Lister<C> {
    api: C,
}

impl<C: ContentsApi> Lister<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// List `path` on the configured branch; `""` is the repository root
    pub async fn list(&self, path: &str) -> Result<Listing> {
        let path = normalize_path(path);

        let listing = match self.api.get_contents(path).await? {
            Contents::Single(record) => Listing::File(record),
            Contents::Listing(records) => {
                let (directories, rest): (Vec<_>, Vec<_>) =
                    records.into_iter().partition(|r| r.is_dir());
                let files = rest.into_iter().filter(|r| r.is_file()).collect();

                Listing::Directory {
                    path: path.to_string(),
                    directories,
                    files,
                }
            }
        };

        tracing::debug!(path, empty = listing.is_empty(), "listed");
        Ok(listing)
    }
}

/// Repository-relative paths never start with a separator
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}
