//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { path, force } => {
            // --path wins over the global --config
            let target = path.as_deref().or(config_path);
            let written = config::write_default(target, force)?;
            println!(
                "{}",
                formatter.success(&format!("Configuration written to {}", written.display()))
            );
        }
        ConfigAction::Show => {
            let effective = config::load(config_path)?;
            println!("{}", formatter.format_config(&effective)?);
        }
    }
    Ok(())
}
