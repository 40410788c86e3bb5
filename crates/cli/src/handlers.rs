//! Command handlers for ghdrop CLI

use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Shell as ClapShell};
use console::style;
use ghdrop_core::{
    config_exists, format_size, get_config_path, load_config, validate_config, ContentsApi,
    DeleteOutcome, Deleter, GitHubClient, Lister, Listing, RemoteFileRecord, Uploader,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::{Table, Tabled};

use crate::wizard::run_init_wizard;

/// Printed between the items of a delete batch
const SEPARATOR: &str = "────────────────────────────────────────";

const UPLOAD_USAGE: &str = "\
Usage: ghdrop upload <file>... [remote-dir] [custom-name]

  One file:       ghdrop upload photo.png [remote-dir] [custom-name]
  Several files:  ghdrop upload a.png b.png [remote-dir]

Files are stored under 'images/' unless a remote directory is given.";

const DELETE_USAGE: &str = "\
Usage: ghdrop delete <path-or-url>...

  ghdrop delete images/old.png
  ghdrop delete https://raw.githubusercontent.com/<owner>/<repo>/<branch>/images/old.png";

/// What an upload invocation asks for, once arguments are sorted
#[derive(Debug, PartialEq, Eq)]
pub enum UploadPlan {
    Single {
        file: PathBuf,
        remote_dir: Option<String>,
        custom_name: Option<String>,
    },
    Batch {
        files: Vec<PathBuf>,
        remote_dir: Option<String>,
    },
}

/// Split arguments into existing files and the remaining strings
pub fn plan_upload(args: &[String]) -> Result<UploadPlan> {
    let (files, others): (Vec<&String>, Vec<&String>) =
        args.iter().partition(|arg| Path::new(arg.as_str()).is_file());

    let mut others = others.into_iter().cloned();

    match files.as_slice() {
        [] => Err(anyhow::anyhow!(
            "no valid files found among: {}",
            args.join(", ")
        )),
        [file] => Ok(UploadPlan::Single {
            file: PathBuf::from(file.as_str()),
            remote_dir: others.next(),
            custom_name: others.next(),
        }),
        _ => Ok(UploadPlan::Batch {
            files: files.iter().map(|f| PathBuf::from(f.as_str())).collect(),
            remote_dir: others.next(),
        }),
    }
}

/// Build the API client from the config file and environment
fn connect() -> Result<GitHubClient> {
    let config = load_config()?;
    Ok(GitHubClient::from_config(&config)?)
}

/// Handle init command
pub async fn handle_init() -> Result<()> {
    run_init_wizard().await
}

/// Handle upload command
pub async fn handle_upload(args: &[String]) -> Result<()> {
    if args.is_empty() {
        eprintln!("{}", UPLOAD_USAGE);
        std::process::exit(1);
    }

    let plan = plan_upload(args)?;
    let uploader = Uploader::new(connect()?);

    match plan {
        UploadPlan::Single {
            file,
            remote_dir,
            custom_name,
        } => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(format!("Uploading {}...", file.display()));
            pb.enable_steady_tick(Duration::from_millis(100));

            let result = uploader
                .upload_file(&file, remote_dir.as_deref(), custom_name.as_deref())
                .await;
            pb.finish_and_clear();
            let uploaded = result?;

            println!("  ✅ Uploaded {}", file.display());
            println!("  Path: {}", uploaded.path);
            println!("  Size: {}", format_size(uploaded.size));
            println!("  URL: {}", uploaded.download_url);
            println!("  CDN: {}", uploaded.cdn_url);

            Ok(())
        }
        UploadPlan::Batch { files, remote_dir } => {
            println!("Uploading {} files...", files.len());

            let urls = uploader.upload_many(&files, remote_dir.as_deref()).await;

            #[derive(Tabled)]
            struct UploadRow {
                file: String,
                url: String,
            }

            let rows: Vec<UploadRow> = files
                .iter()
                .zip(&urls)
                .map(|(file, url)| UploadRow {
                    file: file.display().to_string(),
                    url: if url.is_empty() {
                        style("failed").red().to_string()
                    } else {
                        url.clone()
                    },
                })
                .collect();

            let uploaded = urls.iter().filter(|u| !u.is_empty()).count();

            println!();
            println!("{}", Table::new(rows));
            println!();
            println!("  {}/{} files uploaded", uploaded, files.len());

            Ok(())
        }
    }
}

/// Handle list command
pub async fn handle_list(path: Option<&str>) -> Result<()> {
    let lister = Lister::new(connect()?);
    let path = path.unwrap_or("");
    let shown = if path.trim_matches('/').is_empty() { "/" } else { path };

    println!(
        "Listing {} in {}...",
        shown,
        lister.api().config().display_target()
    );

    match lister.list(path).await {
        Ok(listing) => {
            println!();
            println!("{}", render_listing(&listing));
            Ok(())
        }
        Err(e) if e.is_not_found() => Err(anyhow::anyhow!("Path not found: {}", shown)),
        Err(e) => Err(anyhow::anyhow!("Failed to list {}: {}", shown, e)),
    }
}

/// Render a listing: directories first, then files with size and URL
pub fn render_listing(listing: &Listing) -> String {
    match listing {
        Listing::File(record) => {
            let mut out = String::new();
            out.push_str(&format!("📄 File: {}\n", record.name));
            out.push_str(&format!("  Path: {}\n", record.path));
            out.push_str(&format!("  Size: {}\n", format_size(record.size)));
            out.push_str(&format!("  URL: {}", download_url(record)));
            out
        }
        Listing::Directory {
            directories, files, ..
        } if directories.is_empty() && files.is_empty() => {
            "  📭 Empty directory (0 directories, 0 files)".to_string()
        }
        Listing::Directory {
            directories, files, ..
        } => {
            let mut out = String::new();

            if !directories.is_empty() {
                out.push_str(&format!(
                    "{}\n",
                    style(format!("📁 Directories ({})", directories.len())).bold()
                ));
                for dir in directories {
                    out.push_str(&format!("  {}/\n", dir.name));
                }
            }

            if !files.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }

                #[derive(Tabled)]
                struct FileRow {
                    name: String,
                    size: String,
                    url: String,
                }

                let rows: Vec<FileRow> = files
                    .iter()
                    .map(|f| FileRow {
                        name: f.name.clone(),
                        size: format_size(f.size),
                        url: download_url(f).to_string(),
                    })
                    .collect();

                out.push_str(&format!(
                    "{}\n",
                    style(format!("📄 Files ({})", files.len())).bold()
                ));
                out.push_str(&Table::new(rows).to_string());
            }

            out.trim_end().to_string()
        }
    }
}

fn download_url(record: &RemoteFileRecord) -> &str {
    record.download_url.as_deref().unwrap_or("-")
}

/// Handle delete command
pub async fn handle_delete(inputs: &[String]) -> Result<()> {
    if inputs.is_empty() {
        eprintln!("{}", DELETE_USAGE);
        std::process::exit(1);
    }

    let deleter = Deleter::new(connect()?);
    for (index, input) in inputs.iter().enumerate() {
        if index > 0 {
            println!("{}", SEPARATOR);
        }
        println!("🗑️  Deleting {}...", input);
        report_delete(&deleter.delete_one(input).await);
    }

    Ok(())
}

fn report_delete(outcome: &DeleteOutcome) {
    match &outcome.result {
        Ok(deleted) => {
            println!("  {} Deleted {}", style("✅").green(), deleted.path);
            println!("  Commit: {}", deleted.commit.sha);
        }
        Err(e) if e.is_not_found() => eprintln!("  ❌ File not found: {}", e),
        Err(e) => eprintln!("  ❌ Delete failed: {}", e),
    }
}

/// Handle config commands
pub async fn handle_config(action: &str) -> Result<()> {
    match action {
        "show" => {
            println!("Current configuration:");
            println!();

            let config = load_config()?;
            let advanced = config.advanced.clone().unwrap_or_default();

            println!("GitHub:");
            println!("  Owner: {}", or_unset(&config.github.owner));
            println!("  Repository: {}", or_unset(&config.github.repo));
            println!("  Branch: {}", config.github.branch);
            println!("  Token: {}", mask_token(&config.github.token));
            println!();
            println!("Advanced:");
            println!("  API URL: {}", advanced.api_url);
            println!("  Timeout: {}s", advanced.timeout);
            println!();
            println!(
                "Config file: {} ({})",
                get_config_path()?.display(),
                if config_exists() { "found" } else { "not found" }
            );

            Ok(())
        }
        "path" => {
            println!("{}", get_config_path()?.display());
            Ok(())
        }
        "validate" => {
            println!("Validating configuration...");

            let config = load_config()?;
            validate_config(&config.github)?;
            println!("  ✅ Required settings present");

            println!("  Testing repository access...");
            let lister = Lister::new(GitHubClient::from_config(&config)?);
            lister.list("").await?;
            println!("  ✅ {} is reachable", config.github.display_target());

            Ok(())
        }
        _ => {
            println!("Unknown action: {}", action);
            println!("Available actions: show, path, validate");
            Ok(())
        }
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Show only the first characters of a token
fn mask_token(token: &str) -> String {
    match token.char_indices().nth(4) {
        None if token.is_empty() => "(not set)".to_string(),
        None => "****".to_string(),
        Some((end, _)) => format!("{}****", &token[..end]),
    }
}

/// Handle shell completion generation
pub async fn handle_completion(shell: &str, cmd: &mut Command) -> Result<()> {
    use std::io;

    let clap_shell = match shell {
        "bash" => ClapShell::Bash,
        "zsh" => ClapShell::Zsh,
        "fish" => ClapShell::Fish,
        "elvish" => ClapShell::Elvish,
        "powershell" | "pwsh" => ClapShell::PowerShell,
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported shell: {}\nSupported shells: bash, zsh, fish, elvish, powershell",
                shell
            ));
        }
    };

    generate(clap_shell, cmd, "ghdrop", &mut io::stdout());

    Ok(())
}
