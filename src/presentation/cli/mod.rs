pub mod commands;
pub mod context;
pub mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

use commands::*;
use context::AppContext;
use display::DisplayHelper;

/// dgit - Synchronize git working trees with submodules and content-addressed stores
#[derive(Parser)]
#[command(name = "dgit")]
#[command(about = "Synchronize git working trees with submodules and content-addressed stores")]
#[command(version, long_version = env!("DGIT_BUILD_INFO"))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working tree root (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone a repository into the working tree
    Clone {
        /// Repository URL (git@github.com: URLs are rewritten to HTTPS)
        url: String,

        /// Shallow clone depth (defaults to clone_depth from the config)
        #[arg(long)]
        depth: Option<u32>,

        /// Branch to check out
        #[arg(short, long)]
        branch: Option<String>,

        /// Fetch only the checked out branch
        #[arg(long)]
        single_branch: bool,

        /// Access token for HTTPS remotes
        #[arg(long, env = "DGIT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Check out a reference and remove submodules that disappeared
    Checkout {
        /// Branch, tag or commit
        reference: String,

        /// Discard local changes
        #[arg(short, long)]
        force: bool,

        /// Remote to track when the branch only exists remotely
        #[arg(long)]
        remote: Option<String>,
    },

    /// Clone every submodule listed in .gitmodules, recursively
    Submodules {
        /// Access token for HTTPS remotes
        #[arg(long, env = "DGIT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Export the working tree to a content store and print its CID
    Export {
        /// Source to export to
        #[arg(long, value_enum, default_value = "primary")]
        source: SourceArg,
    },

    /// Import a CID into the working tree
    Import {
        /// Content identifier of an exported tree
        cid: String,

        /// Only try the user-configured source
        #[arg(long)]
        local_only: bool,
    },

    /// Pin the working tree with its commit history
    Pin {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// List pinned items
    Pins {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Remove a pin
    Unpin {
        /// Hash returned by the pinning service
        hash: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Show local storage usage
    Usage,

    /// Store a setting
    SetItem { key: String, value: String },

    /// Print a setting
    GetItem { key: String },

    /// Set the user content source, e.g. http://127.0.0.1:5001
    SetGateway { endpoint: String },

    /// Show commit history
    Log {
        /// Limit the number of commits
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// List local and remote branches
    Branches,
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> Result<()> {
        init_logging(self.cli.verbose);
        colored::control::set_override(!self.cli.no_color);

        match self.handle_command().await {
            Ok(()) => Ok(()),
            Err(e) => {
                DisplayHelper::new(!self.cli.no_color).error(&format!("{:#}", e));
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> Result<()> {
        let root = match &self.cli.directory {
            Some(dir) => dir.clone(),
            None => env::current_dir()?,
        };
        let ctx = AppContext::load(root).await?;
        let display = DisplayHelper::new(!self.cli.no_color);

        match &self.cli.command {
            Commands::Clone {
                url,
                depth,
                branch,
                single_branch,
                token,
            } => {
                CloneCommand {
                    url: url.clone(),
                    depth: *depth,
                    branch: branch.clone(),
                    single_branch: *single_branch,
                    token: token.clone(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Checkout {
                reference,
                force,
                remote,
            } => {
                CheckoutCommand {
                    reference: reference.clone(),
                    force: *force,
                    remote: remote.clone(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Submodules { token } => {
                SubmodulesCommand {
                    token: token.clone(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Export { source } => {
                ExportCommand { source: *source }
                    .execute(&ctx, &display)
                    .await
            }
            Commands::Import { cid, local_only } => {
                ImportCommand {
                    cid: cid.clone(),
                    local_only: *local_only,
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Pin { credentials } => {
                PinCommand {
                    credentials: credentials.credentials(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Pins { credentials } => {
                PinsCommand {
                    credentials: credentials.credentials(),
                }
                .execute(&ctx)
                .await
            }
            Commands::Unpin { hash, credentials } => {
                UnpinCommand {
                    hash: hash.clone(),
                    credentials: credentials.credentials(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Usage => UsageCommand.execute(&ctx, &display),
            Commands::SetItem { key, value } => SetItemCommand {
                key: key.clone(),
                value: value.clone(),
            }
            .execute(&ctx, &display),
            Commands::GetItem { key } => GetItemCommand { key: key.clone() }.execute(&ctx),
            Commands::SetGateway { endpoint } => {
                SetGatewayCommand {
                    endpoint: endpoint.clone(),
                }
                .execute(&ctx, &display)
                .await
            }
            Commands::Log { max_count } => {
                LogCommand {
                    max_count: *max_count,
                }
                .execute(&ctx)
                .await
            }
            Commands::Branches => BranchesCommand.execute(&ctx).await,
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "warn,dgit=debug" } else { "warn,dgit=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
