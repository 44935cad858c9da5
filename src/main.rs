//! selclip - selection clipboard
//!
//! This is the main entry point for the selclip binary.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use selclip::cli::{Cli, CliHandler};
use selclip::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_config(cli.config.clone())?;
    if let Some(debug) = cli.debug {
        config.debug = debug;
    }

    selclip::logging::init(config.debug, cli.verbose);
    info!("selclip v{}", selclip::VERSION);

    let handler = CliHandler::new(config);
    handler.handle_command(cli.command).await?;

    Ok(())
}
