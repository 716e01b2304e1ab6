//! `csl-decoder` library.
//!
//! Decodes tag-read payloads from CSL RFID readers into raddecs, the
//! canonical record of one transmitter heard by one or more receivers.
//! [`CslDecoder`] does the transform; [`SimulatedSource`] drives it with
//! synthetic reads when no reader is at hand.
//!
//! The binary (`src/main.rs`) is responsible for logging setup and process
//! exit codes. Subcommand logic lives in [`crate::app`].

pub mod app;
pub mod decoder;
pub mod duration;
pub mod identifier;
pub mod output;
pub mod payload;
pub mod raddec;
pub mod simulator;
pub mod tag;
pub mod timezone;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use decoder::{CslDecoder, PayloadHandler, RaddecSink, process_tag_data};
pub use identifier::{MacAddress, ReceiverIdentity, resolve_receiver};
pub use output::OutputFormatter;
pub use output::influxdb::InfluxDbFormatter;
pub use output::json::JsonFormatter;
pub use payload::{DecodingOptions, TagEntry, TagReadPayload};
pub use raddec::{Decoding, IdentifierType, Raddec};
pub use simulator::{SimulatedSource, SimulatedSourceOptions, SimulatorError};
pub use tag::{TagError, ValidTag};
pub use timezone::{TimeZoneError, TimeZoneOffset, parse_time_zone};
