//! Command-line surface (spec SPEC_FULL §10.1).

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser, Clone)]
#[command(name = "warwatch", about = "Adaptive faction war monitor")]
pub struct CliOpts {
    /// Wall-clock period of the outer ticker (spec §6.1 default: 5 minutes).
    #[arg(long, value_parser = humantime::parse_duration, default_value = "5m")]
    pub interval: Duration,

    /// Run exactly one cycle and exit, instead of ticking forever.
    #[arg(long)]
    pub once: bool,

    /// Optional path to a config file overlaying environment variables.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliOpts {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
