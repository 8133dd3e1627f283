use anyhow::Result;
use clap::Parser;

mod cli;

use cli::commands::catalog::CatalogCommand;
use cli::commands::config::ConfigCommand;
use cli::{Cli, Commands};
use landflow::LandflowConfig;

/// `--config` replaces the default file and environment layering
fn load_config(cli: &Cli) -> Result<LandflowConfig> {
    match &cli.config {
        Some(path) => {
            LandflowConfig::load_env_file()?;
            LandflowConfig::load_from(path)
        }
        None => Ok(landflow::config()?.clone()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    landflow::init_telemetry(&config.observability)?;
    if cli.config.is_none() {
        landflow::init_config()?;
    }

    let result = run(cli.command, &config);
    landflow::shutdown_telemetry();
    result
}

fn run(command: Commands, config: &LandflowConfig) -> Result<()> {
    match command {
        Commands::Catalog { format } => CatalogCommand::new(format).execute(&config.catalog),
        Commands::Config { write } => ConfigCommand::new(write).execute(config),
        #[cfg(feature = "database")]
        Commands::Migrate => tokio::runtime::Runtime::new()?.block_on(async {
            cli::commands::migrate::MigrateCommand.execute(config).await
        }),
        #[cfg(feature = "database")]
        Commands::Inspect { land_id, events } => {
            tokio::runtime::Runtime::new()?.block_on(async {
                cli::commands::inspect::InspectCommand::new(land_id, events)
                    .execute(config)
                    .await
            })
        }
    }
}
