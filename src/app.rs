//! Core application runner for `csl-decoder`.
//!
//! This module is decoupled from process setup (logging, exit codes, the real
//! stdin/stdout) so both subcommands can be tested with in-memory streams.

use crate::decoder::{CslDecoder, PayloadHandler};
use crate::duration::parse_duration;
use crate::output::{Format, OutputFormatter};
use crate::payload::{DecodingOptions, TagReadPayload};
use crate::raddec::Raddec;
use crate::simulator::{DEFAULT_RSSI, SimulatedSource, SimulatedSourceOptions, SimulatorError};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::mpsc;

/// Origin reported for payloads read from stdin.
pub const STDIN_ORIGIN: &str = "stdin";

/// Decode CSL RFID reader payloads into raddecs.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Verbose output, report payloads that are not valid JSON
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, default_value_t, value_enum, global = true)]
    pub format: Format,

    /// The name of the measurement in InfluxDB line protocol.
    #[arg(long, default_value = "raddec", global = true)]
    pub influxdb_measurement: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode payloads read from stdin, one JSON object per line
    Decode,
    /// Decode reads generated by a simulated reader
    Simulate(SimulateOptions),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateOptions {
    /// Time between simulated reads.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    #[arg(long, value_parser = parse_duration, default_value = "1s")]
    pub period: Duration,

    /// Starting RSSI of the simulated tag, in dBm
    #[arg(long, default_value_t = DEFAULT_RSSI, allow_hyphen_values = true)]
    pub initial_rssi: i32,

    /// Stop after this many records instead of running until interrupted
    #[arg(long)]
    pub count: Option<usize>,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Simulator(#[from] SimulatorError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn drain(
    rx: &mut mpsc::UnboundedReceiver<Raddec>,
    formatter: &dyn OutputFormatter,
    out: &mut dyn Write,
) -> io::Result<()> {
    while let Ok(raddec) = rx.try_recv() {
        formatter.write_raddec(&raddec, out)?;
    }
    Ok(())
}

/// Decode every line of `input` as a payload and write the raddecs to `out`.
///
/// Blank lines are skipped. Lines that are not JSON objects are reported on
/// `err` only when `verbose` is set.
pub fn decode_lines(
    formatter: &dyn OutputFormatter,
    verbose: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let decoder = CslDecoder::new(tx);
    let decoding_options = DecodingOptions::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TagReadPayload>(&line) {
            Ok(payload) => {
                decoder.handle_data(&payload, STDIN_ORIGIN, SystemTime::now(), &decoding_options);
                drain(&mut rx, formatter, out)?;
            }
            Err(e) => {
                log::debug!("line {}: {e}", index + 1);
                if verbose {
                    writeln!(err, "line {}: invalid payload: {e}", index + 1)?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Run a simulated reader and write its raddecs to `out`.
///
/// Runs until `count` records are written, or forever without a count.
pub async fn simulate(
    formatter: &dyn OutputFormatter,
    options: &SimulateOptions,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    if options.count == Some(0) {
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut source_options = SimulatedSourceOptions::new(CslDecoder::new(tx));
    source_options.period = options.period;
    source_options.initial_rssi = options.initial_rssi;
    let source = SimulatedSource::start(source_options)?;

    let mut written = 0;
    while let Some(raddec) = rx.recv().await {
        formatter.write_raddec(&raddec, out)?;
        out.flush()?;
        written += 1;
        if options.count.is_some_and(|count| written >= count) {
            break;
        }
    }

    source.stop();
    Ok(())
}

/// Run the selected subcommand against the given streams.
pub async fn run_with_io(
    options: Options,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let formatter = options.format.formatter(&options.influxdb_measurement);

    match &options.command {
        Command::Decode => decode_lines(formatter.as_ref(), options.verbose, input, out, err),
        Command::Simulate(simulate_options) => {
            simulate(formatter.as_ref(), simulate_options, out).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"pcEthernetMACAddress":"AABBCCDDEEFF","timeZone":"0:00","tags":[{"epc":"ABCDEF","antennaPort":"1","rssi":"-65","timeOfRead":"2023/06/01 10:00:00.000"}]}"#;

    fn options(command: Command) -> Options {
        Options {
            verbose: false,
            format: Format::Json,
            influxdb_measurement: "raddec".to_string(),
            command,
        }
    }

    fn run_decode(options: Options, input: &str) -> (String, String) {
        let mut input = input.as_bytes();
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        tokio_test::block_on(run_with_io(options, &mut input, &mut out, &mut err)).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn decode_writes_one_line_per_record() {
        let input = format!("{PAYLOAD}\n\n{PAYLOAD}\n");
        let (out, err) = run_decode(options(Command::Decode), &input);

        assert!(err.is_empty());
        assert_eq!(out.lines().count(), 2);
        let raddec: Raddec = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(raddec.transmitter_id, "abcdef");
        assert_eq!(raddec.timestamp, 1_685_613_600_000);
        assert_eq!(raddec.rssi_signature[0].receiver_id, "aabbccddeeff");
    }

    #[test]
    fn decode_influx_format() {
        let mut opts = options(Command::Decode);
        opts.format = Format::Influx;
        opts.influxdb_measurement = "csl".to_string();

        let (out, _) = run_decode(opts, PAYLOAD);

        assert!(out.starts_with("csl,"));
        assert!(out.contains("rssi=-65i"));
        assert!(out.trim_end().ends_with("1685613600000000000"));
    }

    #[test]
    fn decode_reports_invalid_lines_only_when_verbose() {
        let input = format!("not json\n{PAYLOAD}\n");

        let (out, err) = run_decode(options(Command::Decode), &input);
        assert_eq!(out.lines().count(), 1);
        assert!(err.is_empty());

        let mut verbose = options(Command::Decode);
        verbose.verbose = true;
        let (out, err) = run_decode(verbose, &input);
        assert_eq!(out.lines().count(), 1);
        assert!(err.contains("line 1: invalid payload"));
    }

    #[test]
    fn decode_payload_without_valid_tags_writes_nothing() {
        let input = r#"{"pcEthernetMACAddress":"AABBCCDDEEFF","tags":[{"epc":"AB"}]}"#;
        let (out, err) = run_decode(options(Command::Decode), input);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn simulate_stops_after_count() {
        let opts = options(Command::Simulate(SimulateOptions {
            period: Duration::from_millis(100),
            initial_rssi: -75,
            count: Some(3),
        }));

        let mut input: &[u8] = &[];
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        tokio_test::assert_ok!(run_with_io(opts, &mut input, &mut out, &mut err).await);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 3);
        for line in out.lines() {
            let raddec: Raddec = serde_json::from_str(line).unwrap();
            assert_eq!(raddec.transmitter_id, "7eda9038051002710002c0ae");
            assert!((-80..=-60).contains(&raddec.rssi_signature[0].rssi));
        }
    }

    #[tokio::test]
    async fn simulate_rejects_zero_period() {
        let opts = options(Command::Simulate(SimulateOptions {
            period: Duration::ZERO,
            initial_rssi: DEFAULT_RSSI,
            count: Some(1),
        }));

        let mut input: &[u8] = &[];
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let result = run_with_io(opts, &mut input, &mut out, &mut err).await;

        assert!(matches!(
            result,
            Err(RunError::Simulator(SimulatorError::ZeroPeriod))
        ));
    }

    #[test]
    fn options_parse_from_command_line() {
        let opts = Options::try_parse_from([
            "csl-decoder",
            "simulate",
            "--period",
            "500ms",
            "--initial-rssi",
            "-65",
            "--count",
            "10",
            "--format",
            "influx",
        ])
        .unwrap();

        assert_eq!(opts.format, Format::Influx);
        match opts.command {
            Command::Simulate(sim) => {
                assert_eq!(sim.period, Duration::from_millis(500));
                assert_eq!(sim.initial_rssi, -65);
                assert_eq!(sim.count, Some(10));
            }
            Command::Decode => panic!("expected simulate"),
        }
    }

    #[test]
    fn options_parse_measurement_name() {
        let opts =
            Options::try_parse_from(["csl-decoder", "decode", "--influxdb-measurement", "csl"])
                .unwrap();
        assert_eq!(opts.influxdb_measurement, "csl");

        let opts = Options::try_parse_from(["csl-decoder", "decode"]).unwrap();
        assert_eq!(opts.influxdb_measurement, "raddec");
    }
}
