use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qcal_cli::commands::{add, aliases, calendars, event, serve};
use qcal_cli::{AliasAction, Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Add { line, json }) => {
            add::run(&mut stdout, &mut io::stderr(), &config, line, *json).await?;
        }
        Some(Commands::Event(args)) => event::run(&mut stdout, &config, args).await?,
        Some(Commands::Calendars) => calendars::run(&mut stdout, &config).await?,
        Some(Commands::Aliases { action }) => match action {
            AliasAction::List => aliases::list(&mut stdout, &config)?,
            AliasAction::Set { alias, calendar_id } => {
                aliases::set(&mut stdout, &config, alias, calendar_id)?;
            }
            AliasAction::Remove { alias } => aliases::remove(&mut stdout, &config, alias)?,
        },
        Some(Commands::Serve { address }) => serve::run(&config, *address).await?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
