#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, Config};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.log_format)?;
    tracing::debug!(?config, "starting flakegen");

    let mut out = BufWriter::new(io::stdout().lock());
    commands::run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}
