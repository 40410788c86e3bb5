//! Configuration management for ghdrop

use crate::contents::{CDN_HOST, RAW_HOST};
use crate::error::{Error, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration directory name
const CONFIG_DIR: &str = "ghdrop";

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Environment variables overriding the config file
pub const ENV_OWNER: &str = "GITHUB_OWNER";
pub const ENV_REPO: &str = "GITHUB_REPO";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_BRANCH: &str = "GITHUB_BRANCH";
pub const ENV_API_URL: &str = "GITHUB_API_URL";

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub github: ClientConfig,
    pub advanced: Option<AdvancedConfig>,
}

/// Target repository and credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl ClientConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            branch: branch.into(),
        }
    }

    /// `owner/repo@branch`, for messages
    pub fn display_target(&self) -> String {
        format!("{}/{}@{}", self.owner, self.repo, self.branch)
    }

    /// Raw-content URL of a repository path
    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "https://{}/{}/{}/{}/{}",
            RAW_HOST,
            self.owner,
            self.repo,
            self.branch,
            path.trim_start_matches('/')
        )
    }

    /// jsDelivr URL of a repository path
    pub fn cdn_url(&self, path: &str) -> String {
        format!(
            "https://{}/gh/{}/{}@{}/{}",
            CDN_HOST,
            self.owner,
            self.repo,
            self.branch,
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            token: String::new(),
            branch: default_branch(),
        }
    }
}

/// Advanced configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
        }
    }
}

// Default values
fn default_branch() -> String {
    "main".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let home = home_dir().ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR))
}

/// Get the configuration file path
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Read the config file if present, then apply environment overrides
pub fn load_config() -> Result<ConfigFile> {
    let config_path = get_config_path()?;

    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            Error::InvalidConfig(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!("Failed to parse config file: {}", e))
        })?
    } else {
        ConfigFile::default()
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Override file values with non-empty variables returned by `lookup`
pub fn apply_env_overrides<F>(mut config: ConfigFile, lookup: F) -> ConfigFile
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(owner) = var(ENV_OWNER) {
        config.github.owner = owner;
    }
    if let Some(repo) = var(ENV_REPO) {
        config.github.repo = repo;
    }
    if let Some(token) = var(ENV_TOKEN) {
        config.github.token = token;
    }
    if let Some(branch) = var(ENV_BRANCH) {
        config.github.branch = branch;
    }
    if let Some(api_url) = var(ENV_API_URL) {
        config.advanced.get_or_insert_with(AdvancedConfig::default).api_url = api_url;
    }
    if config.github.branch.trim().is_empty() {
        config.github.branch = default_branch();
    }

    config
}

/// Save configuration to file
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }
    let config_path = config_dir.join(CONFIG_FILE);

    let content = toml::to_string_pretty(config)?;

    fs::write(&config_path, content).map_err(|e| {
        Error::Config(format!("Failed to write config file: {}", e))
    })?;

    // The file holds the token: owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&config_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&config_path, perms)?;
    }

    Ok(config_path)
}

/// Validate the repository settings
pub fn validate_config(config: &ClientConfig) -> Result<()> {
    let required = [
        (ENV_OWNER, &config.owner),
        (ENV_REPO, &config.repo),
        (ENV_TOKEN, &config.token),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(Error::Config(format!(
            "Missing required settings: {} (set them in the environment or run 'ghdrop init')",
            missing.join(", ")
        )));
    }

    if config.branch.trim().is_empty() {
        return Err(Error::InvalidInput("Branch name cannot be empty".to_string()));
    }

    Ok(())
}

/// Check if configuration exists
pub fn config_exists() -> bool {
    get_config_path().map(|p| p.exists()).unwrap_or(false)
}
