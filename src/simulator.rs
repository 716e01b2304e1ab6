//! Simulated CSL reader.
//!
//! [`SimulatedSource`] produces one tag-read payload per period, as a reader
//! seeing a single tag would, and hands it to a [`PayloadHandler`]. The tag's
//! RSSI follows a bounded random walk so downstream consumers see plausible
//! variation. The generator runs on its own tokio task until stopped.

use crate::decoder::PayloadHandler;
use crate::identifier::MacAddress;
use crate::payload::{DecodingOptions, TagEntry, TagReadPayload};
use chrono::{DateTime, Local, Offset, TimeZone};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);
pub const DEFAULT_RSSI: i32 = -70;
pub const MIN_RSSI: i32 = -80;
pub const MAX_RSSI: i32 = -60;
/// Width of the range each random-walk step is drawn from.
pub const RSSI_RANDOM_DELTA: i32 = 5;

pub const SIMULATED_ETHERNET_MAC: MacAddress = MacAddress([0x00, 0x05, 0x7B, 0x87, 0x00, 0x00]);
pub const SIMULATED_EPC: &str = "7EDA9038051002710002C0AE";
pub const SIMULATED_ANTENNA_PORT: &str = "1";
/// Origin passed to the handler for every simulated payload.
pub const SIMULATED_ORIGIN: &str = "test";

#[derive(Error, Debug, PartialEq)]
pub enum SimulatorError {
    #[error("simulation period must be greater than zero")]
    ZeroPeriod,
}

/// Configuration for a [`SimulatedSource`].
#[derive(Debug, Clone)]
pub struct SimulatedSourceOptions<D> {
    pub decoder: D,
    pub period: Duration,
    pub decoding_options: DecodingOptions,
    pub initial_rssi: i32,
}

impl<D> SimulatedSourceOptions<D> {
    /// Options with the default period, empty decoding options and the
    /// default RSSI baseline.
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            period: DEFAULT_PERIOD,
            decoding_options: DecodingOptions::default(),
            initial_rssi: DEFAULT_RSSI,
        }
    }
}

/// Random walk of the simulated signal strength, kept within
/// [`MIN_RSSI`]..=[`MAX_RSSI`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RssiWalk {
    rssi: i32,
}

impl RssiWalk {
    pub fn new(initial: i32) -> Self {
        Self {
            rssi: initial.clamp(MIN_RSSI, MAX_RSSI),
        }
    }

    pub fn current(&self) -> i32 {
        self.rssi
    }

    /// Move by a step drawn uniformly from `-Δ/2..=Δ/2` and clamp.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> i32 {
        let half = RSSI_RANDOM_DELTA / 2;
        self.rssi = (self.rssi + rng.gen_range(-half..=half)).clamp(MIN_RSSI, MAX_RSSI);
        self.rssi
    }
}

impl Default for RssiWalk {
    fn default() -> Self {
        Self::new(DEFAULT_RSSI)
    }
}

/// Build the payload a reader would send for one read of the simulated tag.
///
/// `timeOfRead` is the wall-clock time in `now`'s zone and `timeZone` is that
/// zone's offset in whole hours (rounded down), as `H:00`.
pub fn simulated_payload<Tz: TimeZone>(now: &DateTime<Tz>, rssi: i32) -> TagReadPayload {
    let local = now.naive_local();
    let time_of_read = format!(
        "{} {}",
        local.format("%Y/%m/%d"),
        local.format("%H:%M:%S%.3f")
    );
    let offset_hours = now.offset().fix().local_minus_utc().div_euclid(3600);

    TagReadPayload {
        pc_ethernet_mac_address: Some(SIMULATED_ETHERNET_MAC.to_string().to_uppercase()),
        pc_wifi_mac_address: Some(String::new()),
        time_zone: Some(format!("{offset_hours}:00")),
        tags: vec![TagEntry::new(
            SIMULATED_EPC,
            SIMULATED_ANTENNA_PORT,
            rssi.to_string(),
            time_of_read,
        )],
    }
}

/// Handle to a running simulation. Stops the simulation when dropped.
#[derive(Debug)]
pub struct SimulatedSource {
    task: JoinHandle<()>,
}

impl SimulatedSource {
    /// Spawn the simulation on the current tokio runtime.
    ///
    /// The first payload is emitted one period after start.
    ///
    /// # Errors
    /// Returns `SimulatorError::ZeroPeriod` if `options.period` is zero.
    pub fn start<D>(options: SimulatedSourceOptions<D>) -> Result<Self, SimulatorError>
    where
        D: PayloadHandler + 'static,
    {
        if options.period.is_zero() {
            return Err(SimulatorError::ZeroPeriod);
        }
        log::info!(
            "starting simulated reader, one read every {:?}",
            options.period
        );
        Ok(Self {
            task: tokio::spawn(emit_radio_decodings(options)),
        })
    }

    pub fn stop(&self) {
        if !self.task.is_finished() {
            log::info!("stopping simulated reader");
        }
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn emit_radio_decodings<D: PayloadHandler>(options: SimulatedSourceOptions<D>) {
    let SimulatedSourceOptions {
        decoder,
        period,
        decoding_options,
        initial_rssi,
    } = options;

    let mut walk = RssiWalk::new(initial_rssi);
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // interval() completes its first tick immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let now = Local::now();
        let payload = simulated_payload(&now, walk.current());
        walk.step(&mut rng);

        decoder.handle_data(
            &payload,
            SIMULATED_ORIGIN,
            SystemTime::from(now),
            &decoding_options,
        );
    }
}
