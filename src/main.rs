/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for kkr-rs

use clap::Parser;
use kkr_rs::cli::{self, Cli, RunConfig};
use log::debug;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let config = RunConfig::load_or_default(&cli.config)?;
    debug!("kkr-rs v{} with {:?}", kkr_rs::VERSION, config);

    cli::run(cli, &config)
}
