use std::io::Write;

use anyhow::Context;
use flakegen::{ParsedSnowflake, SnowflakeGenerator, SnowflakeId};
use serde::Serialize;

use crate::config::{Command, Config};

/// One line of `parse` output.
#[derive(Serialize)]
struct ParsedLine {
    #[serde(with = "flakegen::serde::as_decimal_string")]
    id: SnowflakeId,
    #[serde(flatten)]
    parsed: ParsedSnowflake,
}

pub fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate { count } => generate(config, *count, out),
        Command::Parse { ids } => parse(config, ids, out),
    }
}

fn generate(config: &Config, count: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let generator = config.generator();
    for _ in 0..count {
        let id = generator
            .generate(config.worker_id, config.process_id)
            .context("failed to generate id")?;
        writeln!(out, "{id}")?;
    }
    tracing::debug!(count, "generated ids");
    Ok(())
}

fn parse(config: &Config, ids: &[String], out: &mut impl Write) -> anyhow::Result<()> {
    for raw in ids {
        let id: SnowflakeId = raw.parse().with_context(|| format!("cannot parse {raw:?}"))?;
        let line = ParsedLine {
            id,
            parsed: config.codec.parse(id),
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }
    Ok(())
}
