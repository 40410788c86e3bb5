//! ghdrop-core - Core library for the ghdrop CLI
//!
//! Uploads, lists and deletes files stored in a GitHub repository through the
//! REST contents API. The command objects ([`Uploader`], [`Lister`],
//! [`Deleter`]) are generic over [`ContentsApi`], implemented by
//! [`GitHubClient`].

pub mod config;
pub mod contents;
pub mod delete;
pub mod error;
pub mod github;
pub mod list;
pub mod size;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{
    apply_env_overrides, config_exists, get_config_path, load_config, save_config,
    validate_config,
};
pub use config::{AdvancedConfig, ClientConfig, ConfigFile};
pub use contents::{
    CommitInfo, Contents, ContentsApi, EntryKind, FileCommit, RemoteFileRecord,
};
pub use delete::{parse_path, DeleteOutcome, DeletedFile, Deleter};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use list::{normalize_path, Lister, Listing};
pub use size::format_size;
pub use upload::{generated_file_name, remote_path, UploadedFile, Uploader, DEFAULT_REMOTE_DIR};
