//! Main CLI application structure

use clap::{Parser, Subcommand};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{history, stage};
use crate::storage::{Config, Repository};

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "ZIT_LOG";

#[derive(Parser)]
#[command(name = "zit")]
#[command(author, version, about = "A minimal local version-control tool")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Stage new and modified files
    ///
    /// Examples:
    ///   zit add a.txt           # One file
    ///   zit add src docs        # Everything below these directories
    ///   zit add .               # The whole working tree
    Add {
        /// Files or directories to stage
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Record the staged files as a new commit
    Commit {
        /// Commit message
        message: String,

        /// Author for this commit (overrides config)
        #[arg(long, env = "ZIT_AUTHOR")]
        author: Option<String>,
    },

    /// Show new, modified and staged files
    Status,

    /// List commits, most recent first
    Log {
        /// Show only the N most recent commits
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
}

/// Installs the stderr diagnostics subscriber
fn init_tracing(verbose: bool) {
    let default = if verbose { "zit=debug" } else { "zit=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Picks the output format from the flag, then the global config
fn resolve_format(flag: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = flag {
        return format;
    }
    match Config::load_global() {
        Ok(global) => global.default_format.into(),
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(error = %reason, "ignoring unreadable global config");
            OutputFormat::default()
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(resolve_format(cli.format), cli.verbose);

    output.verbose("zit starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing repository at: {}", path));
            let repo = Repository::init(&path)?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "root": repo.root().display().to_string(),
                    "metadata": repo.zit_dir().display().to_string(),
                }));
            } else {
                output.success(&format!(
                    "Initialized empty zit repository in {}",
                    repo.zit_dir().display()
                ));
            }
        }

        Commands::Add { paths } => {
            output.verbose_ctx("add", &format!("Staging: {:?}", paths));
            stage::add(&output, &paths)?
        }

        Commands::Commit { message, author } => {
            history::commit(&output, &message, author.as_deref())?
        }

        Commands::Status => {
            output.verbose("Scanning working tree");
            stage::status(&output)?
        }

        Commands::Log { limit } => history::log(&output, limit)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
