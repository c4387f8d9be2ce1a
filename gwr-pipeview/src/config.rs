// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Configuration for the converter.
//!
//! Settings are layered in order of increasing priority:
//!  - the defaults from [`Config::default()`]
//!  - an optional TOML file passed with `--config`
//!  - values given on the command line
//!
//! An example configuration file:
//!
//! ```toml
//! cycle_time = 500
//! load = true
//! store = true
//! unretired = true
//! log_level = "info"
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::classifier::{DEFAULT_CYCLE_TIME, LineClassifier};
use crate::emitter::EmitOptions;
use crate::pipeview_error;
use crate::types::{Cycle, InsnKind, KindSet, PipeViewError, PipeViewResult};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "gwr-pipeview",
    about = "Generate an o3-pipeview trace from a Saturn simulation log"
)]
pub struct Cli {
    /// Cycle time in ticks
    #[arg(short = 'c', long, value_name = "N")]
    pub cycle_time: Option<Cycle>,

    /// Show only compute (non-memory) instructions
    #[arg(short = 'X', long)]
    pub compute: bool,

    /// Show only load instructions
    #[arg(short = 'L', long)]
    pub load: bool,

    /// Show only store instructions
    #[arg(short = 'S', long)]
    pub store: bool,

    /// Show instructions that were dispatched but never issued
    #[arg(short = 'u', long)]
    pub unretired: bool,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Level of diagnostic messages written to stderr
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write the trace to this file rather than stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Simulation log file (omit or use `-` to read stdin)
    pub input: Option<PathBuf>,
}

/// The settings that can come from any source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output time units per simulator cycle.
    pub cycle_time: Cycle,
    pub compute: bool,
    pub load: bool,
    pub store: bool,
    pub unretired: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_time: DEFAULT_CYCLE_TIME,
            compute: false,
            load: false,
            store: false,
            unretired: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from all sources.
    pub fn from_cli(cli: &Cli) -> PipeViewResult<Self> {
        let figment = Config::figment(cli.config.as_deref())?;
        let mut config = Config::figment_extract(&figment)?;
        config.clap_merge(cli);
        config.validate()?;
        Ok(config)
    }

    /// Defaults merged with the configuration file, if given.
    pub fn figment(conf_file: Option<&Path>) -> PipeViewResult<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(conf_file) = conf_file {
            if !conf_file.is_file() {
                return pipeview_error!(
                    "configuration file {} does not exist",
                    conf_file.display()
                );
            }
            figment = figment.merge(Toml::file(conf_file));
        }
        Ok(figment)
    }

    fn figment_extract(figment: &Figment) -> PipeViewResult<Self> {
        figment
            .extract()
            .map_err(|e| PipeViewError(format!("invalid configuration: {e}")))
    }

    /// Apply the values present on the command line.
    fn clap_merge(&mut self, cli: &Cli) {
        if let Some(cycle_time) = cli.cycle_time {
            self.cycle_time = cycle_time;
        }
        self.compute |= cli.compute;
        self.load |= cli.load;
        self.store |= cli.store;
        self.unretired |= cli.unretired;
        if let Some(log_level) = &cli.log_level {
            self.log_level.clone_from(log_level);
        }
    }

    pub fn validate(&self) -> PipeViewResult<()> {
        if self.cycle_time <= 0 {
            return pipeview_error!("cycle time must be positive, got {}", self.cycle_time);
        }
        Ok(())
    }

    /// Instruction kinds to emit. Selecting none means all of them.
    #[must_use]
    pub fn select(&self) -> KindSet {
        let selected: KindSet = [
            (self.compute, InsnKind::Compute),
            (self.load, InsnKind::Load),
            (self.store, InsnKind::Store),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect();

        if selected.is_empty() {
            KindSet::ALL
        } else {
            selected
        }
    }

    #[must_use]
    pub fn classifier(&self) -> LineClassifier {
        LineClassifier::new(self.cycle_time)
    }

    #[must_use]
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            select: self.select(),
            unretired: self.unretired,
        }
    }
}
