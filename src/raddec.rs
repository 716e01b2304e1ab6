//! Canonical radio decoding record ("raddec").
//!
//! A raddec names one transmitter, the UTC time it was decoded and the
//! receivers that heard it. Records produced from CSL payloads always carry
//! exactly one decoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier encodings understood by raddec consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    Unknown,
    Eui48,
    Epc96,
}

impl IdentifierType {
    /// Numeric code used by raddec wire formats.
    pub fn code(self) -> u8 {
        match self {
            IdentifierType::Unknown => 0,
            IdentifierType::Eui48 => 2,
            IdentifierType::Epc96 => 4,
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierType::Unknown => write!(f, "unknown"),
            IdentifierType::Eui48 => write!(f, "eui48"),
            IdentifierType::Epc96 => write!(f, "epc96"),
        }
    }
}

/// One receiver's report of a transmitter sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoding {
    pub receiver_id: String,
    pub receiver_id_type: IdentifierType,
    /// Signal strength in dBm
    pub rssi: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raddec {
    pub transmitter_id: String,
    pub transmitter_id_type: IdentifierType,
    /// UTC epoch milliseconds
    pub timestamp: i64,
    pub rssi_signature: Vec<Decoding>,
}

impl Raddec {
    /// Create a raddec with no decodings attached yet.
    pub fn new(
        transmitter_id: impl Into<String>,
        transmitter_id_type: IdentifierType,
        timestamp: i64,
    ) -> Self {
        Self {
            transmitter_id: transmitter_id.into(),
            transmitter_id_type,
            timestamp,
            rssi_signature: Vec::new(),
        }
    }

    pub fn add_decoding(&mut self, decoding: Decoding) {
        self.rssi_signature.push(decoding);
    }
}
