//! Output formatters for raddecs.
//!
//! The binary writes one line per record. Formatters decide what that line
//! looks like: JSON for downstream services, InfluxDB line protocol for
//! Telegraf-style collectors.

pub mod influxdb;
pub mod json;

use crate::raddec::Raddec;
use std::io::{self, Write};

/// Trait for writing raddecs as lines of text.
pub trait OutputFormatter: Send + Sync {
    /// Write `raddec` to `out`, terminating every line with `\n`.
    fn write_raddec(&self, raddec: &Raddec, out: &mut dyn Write) -> io::Result<()>;
}

/// Output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Influx,
}

impl Format {
    pub fn formatter(self, measurement_name: &str) -> Box<dyn OutputFormatter> {
        match self {
            Format::Json => Box::new(json::JsonFormatter),
            Format::Influx => Box::new(influxdb::InfluxDbFormatter::new(measurement_name)),
        }
    }
}
