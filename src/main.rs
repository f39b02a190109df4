mod auth;
mod cli;
mod config;
mod error;
mod logging;
mod output;
mod providers;
mod steps;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    if cli.version {
        output::print_version();
        return Ok(());
    }

    output::print_banner();

    info!("Starting stepline");
    cli.execute().await?;

    Ok(())
}
