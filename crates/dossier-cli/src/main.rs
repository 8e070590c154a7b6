//! Dossier CLI - collect product facts from the web into one JSON record.

use clap::Parser;
use dossier_cli::commands;
use dossier_cli::{logging, Cli, Command, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> dossier_cli::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let formatter = Formatter::new(cli.format.into(), !cli.no_color);
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Run(args) => commands::execute_run(args, config_path, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, config_path, &formatter)?,
    }

    Ok(())
}
