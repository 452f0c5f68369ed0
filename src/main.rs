use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod commands;

use westwheels_pricing::catalog::Catalog;
use westwheels_pricing::config::Config;
use westwheels_pricing::init_tracing;
use westwheels_pricing::pricing::Estimator;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Configuration errors are reported before tracing is up
    let config = Config::load(args.env_file.as_deref())?;
    init_tracing(&config.log_filter);
    if let Some(path) = &config.env_file {
        info!("Loaded environment from {}", path.display());
    }

    let estimator = Estimator::from_config(Catalog::builtin()?, &config);
    commands::execute(args.command, &estimator)
}
