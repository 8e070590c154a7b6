//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use dossier_render::BrowserKind;
use std::path::PathBuf;

/// Dossier CLI - Collect product facts from the web into one JSON record.
#[derive(Debug, Parser)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file path (default: ~/.dossier/config.toml)
    #[arg(short, long, global = true, env = "DOSSIER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (output path only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every configured field and write the record
    Run(RunArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Write the record here instead of the configured output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Browser for rendered fields (chrome, chromium, firefox, safari)
    #[arg(short, long)]
    pub browser: Option<BrowserKind>,

    /// Evaluate fields concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Global run deadline in seconds
    #[arg(short, long)]
    pub deadline: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration as TOML
    Init {
        /// Destination (default: the configuration file path)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
            CliFormat::Quiet => crate::output::OutputFormat::Quiet,
        }
    }
}
