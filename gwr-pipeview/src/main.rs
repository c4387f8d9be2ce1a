// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Generate an o3-pipeview trace from a Saturn simulation log.
//!
//! For example, run using:
//!   cargo run --bin gwr-pipeview -- --cycle-time 1 sim.out > trace.out

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use gwr_pipeview::config::{Cli, Config};
use gwr_pipeview::emitter::emit;
use gwr_pipeview::reader::read_log_from;
use log::{LevelFilter, info};
use simplelog::{ConfigBuilder, WriteLogger};

/// Take the level string and convert it to a `LevelFilter`
fn choose_level(lvl: &str) -> LevelFilter {
    match LevelFilter::from_str(lvl) {
        Ok(level) => level,
        Err(_) => {
            let default = LevelFilter::Warn;
            eprintln!("Unable to parse level string '{lvl}', defaulting to {default}");
            default
        }
    }
}

fn init_logging(level: LevelFilter) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off) // No timestamps are printed
        .set_location_level(LevelFilter::Off) // No file locations are printed
        .set_thread_level(LevelFilter::Off) // No thread information is printed
        .set_target_level(LevelFilter::Off) // No target is printed
        .build();
    WriteLogger::init(level, config, io::stderr()).context("unable to initialise logging")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // The message already reads as an error once printed by `main`
    let config = Config::from_cli(&cli).map_err(|e| anyhow!(e.0))?;
    init_logging(choose_level(&config.log_level))?;

    let (table, stats) = read_log_from(cli.input.as_deref(), &config.classifier())?;
    info!(
        "Read {} lines ({} trace lines): {} instructions, {} anomalies",
        stats.lines,
        stats.trace_lines,
        table.len(),
        table.anomalies().len()
    );

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("unable to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let num_uops = emit(&table, &config.emit_options(), &mut writer)?;
    info!("Emitted {num_uops} uops");

    Ok(())
}
