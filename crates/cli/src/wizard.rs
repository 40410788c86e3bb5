//! Interactive setup wizard for ghdrop configuration

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use ghdrop_core::{save_config, ClientConfig, ConfigFile};
use indicatif::{ProgressBar, ProgressStyle};

/// Run the interactive setup wizard
pub async fn run_init_wizard() -> Result<()> {
    println!("🚀 Welcome to ghdrop setup!\n");

    println!("You will need:");
    println!("  1. The owner (user or organization) of the target repository");
    println!("  2. The repository name");
    println!("  3. A personal access token with contents read/write access\n");

    let owner = prompt_name("Repository owner")?;
    let repo = prompt_name("Repository name")?;
    let token = prompt_token()?;
    let branch = prompt_branch()?;

    // Summary
    println!("\n📋 Configuration summary:");
    println!("  Repository: {}/{}", owner, repo);
    println!("  Branch: {}", branch);
    println!("  Token: {}...", token.chars().take(4).collect::<String>());

    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save this configuration?")
        .default(false)
        .interact()?;

    if !confirm {
        println!("❌ Configuration cancelled");
        return Ok(());
    }

    let config = ConfigFile {
        github: ClientConfig::new(owner, repo, token, branch),
        advanced: None,
    };

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Saving configuration...");

    let path = save_config(&config)?;

    pb.inc(1);
    pb.finish_with_message("✅ Configuration saved!");

    println!("\n🎉 Setup complete!");
    println!("\nConfiguration saved to: {}", path.display());
    println!("Environment variables (GITHUB_OWNER, GITHUB_REPO, GITHUB_TOKEN, GITHUB_BRANCH) still take precedence.");
    println!("\nYou can now use ghdrop:");
    println!("  $ ghdrop upload photo.png");
    println!("  $ ghdrop list images");
    println!("  $ ghdrop delete images/photo-1700000000000.png");

    Ok(())
}

/// Prompt for an owner or repository name
fn prompt_name(prompt: &str) -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.is_empty() {
                Err("Value cannot be empty")
            } else if !input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            {
                Err("Only letters, digits, '-', '_' and '.' are allowed")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt, e))
}

/// Prompt for the access token
fn prompt_token() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Access token")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Access token cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read access token: {}", e))
}

/// Prompt for the target branch
fn prompt_branch() -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Branch")
        .default("main".to_string())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Branch cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read branch: {}", e))
}
