//! Dossier CLI library.
//!
//! Argument parsing, configuration file handling, logging setup and output
//! formatting for the `dossier` binary.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
