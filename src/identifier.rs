//! Receiver identifiers for CSL readers.
//!
//! CSL readers report the MAC addresses of their Ethernet and WiFi interfaces
//! as bare hex strings. This module provides a compact EUI-48 representation
//! and the rule that picks one of those addresses as the receiver identity of
//! every raddec decoded from a payload.

use crate::raddec::IdentifierType;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An EUI-48 hardware address stored as a compact 6-byte array.
///
/// Displays as 12 lowercase hex digits without separators, which is the form
/// raddec receiver identifiers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Errors returned when parsing a MAC address string.
#[derive(Error, Debug, PartialEq)]
pub enum ParseMacError {
    #[error("invalid MAC address: expected 12 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid MAC address: '{0}' is not valid hex")]
    InvalidHex(String),
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Accepts `00057B870000`, `00:05:7B:87:00:00` and `00-05-7B-87-00-00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 {
            return Err(ParseMacError::InvalidLength(digits.len()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseMacError::InvalidHex(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte =
                u8::from_str_radix(pair, 16).map_err(|_| ParseMacError::InvalidHex(s.to_string()))?;
        }

        Ok(MacAddress(bytes))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

/// The receiver identity shared by every raddec decoded from one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverIdentity {
    pub id: String,
    pub id_type: IdentifierType,
}

impl ReceiverIdentity {
    /// Identity used when the payload names no interface address.
    pub fn unknown() -> Self {
        Self {
            id: String::new(),
            id_type: IdentifierType::Unknown,
        }
    }

    fn eui48(raw: &str) -> Self {
        let id = match raw.parse::<MacAddress>() {
            Ok(mac) => mac.to_string(),
            Err(e) => {
                log::warn!("receiver address '{raw}' is not an EUI-48 ({e}), using it verbatim");
                raw.to_lowercase()
            }
        };
        Self {
            id,
            id_type: IdentifierType::Eui48,
        }
    }
}

/// Pick the receiver identity from the reader's interface addresses.
///
/// The Ethernet address wins when present and non-empty, then the WiFi
/// address. With neither, the identity is empty and of unknown type.
pub fn resolve_receiver(ethernet: Option<&str>, wifi: Option<&str>) -> ReceiverIdentity {
    [ethernet, wifi]
        .into_iter()
        .flatten()
        .find(|address| !address.is_empty())
        .map(ReceiverIdentity::eui48)
        .unwrap_or_else(ReceiverIdentity::unknown)
}
