mod cli;
mod logs;
mod watch;

use clap::Parser;
use cli::{Cli, Commands};
use smswatch::config::Config;
use smswatch::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing("info");

    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Watch(args) => watch::run(config, args.target).await?,
        Commands::Logs { action } => logs::run(&config, action)?,
        Commands::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}
