use anyhow::Result;
use clap::{CommandFactory, Parser};
use color_eyre::config::HookBuilder;
use tracing_subscriber::EnvFilter;

mod handlers;
mod wizard;

/// ghdrop - upload, list and delete files in a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "ghdrop")]
#[command(version)]
#[command(about = "Use a GitHub repository as a file drop from your terminal", long_about = None)]
struct Cli {
    /// Log requests and responses
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Upload files: <file>... [remote-dir] [custom-name]
    Upload {
        /// Local files, then optional remote directory and name
        args: Vec<String>,
    },

    /// List a directory or show a single file
    #[command(alias = "ls")]
    List {
        /// Repository path (default: root)
        path: Option<String>,
    },

    /// Delete files by repository path or URL
    #[command(alias = "rm")]
    Delete {
        /// Paths, raw.githubusercontent.com or jsDelivr URLs
        inputs: Vec<String>,
    },

    /// Interactive setup
    Init,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Shell completion
    Completion {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Show the resolved configuration
    Show,
    /// Print the config file location
    Path,
    /// Check settings and repository access
    Validate,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Upload { args } => handlers::handle_upload(&args).await,
        Commands::List { path } => handlers::handle_list(path.as_deref()).await,
        Commands::Delete { inputs } => handlers::handle_delete(&inputs).await,
        Commands::Init => handlers::handle_init().await,
        Commands::Config { action } => {
            let action_str = match action {
                ConfigAction::Show => "show",
                ConfigAction::Path => "path",
                ConfigAction::Validate => "validate",
            };
            handlers::handle_config(action_str).await
        }
        Commands::Completion { shell } => {
            handlers::handle_completion(&shell, &mut Cli::command()).await
        }
    }
}
