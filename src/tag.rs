//! Per-tag validation.
//!
//! A tag entry becomes a raddec only when every field parses strictly.
//! Anything else is classified with a [`TagError`] and dropped by the
//! decoder.

use crate::payload::TagEntry;
use crate::timezone::{TimeOfReadError, parse_utc_millis};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TagError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid EPC '{0}'")]
    InvalidEpc(String),
    #[error("invalid antenna port '{0}'")]
    InvalidAntennaPort(String),
    #[error("invalid RSSI '{0}'")]
    InvalidRssi(String),
    #[error(transparent)]
    InvalidTimeOfRead(#[from] TimeOfReadError),
}

/// A tag entry whose fields all parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTag {
    /// EPC as lowercase hex
    pub epc: String,
    pub antenna_port: u16,
    /// Signal strength in dBm
    pub rssi: i32,
    /// Time of read taken as UTC, before time zone correction
    pub time_of_read_millis: i64,
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, TagError> {
    field.as_deref().ok_or(TagError::MissingField(name))
}

impl TagEntry {
    /// Check that all four fields are present and well formed.
    pub fn validate(&self) -> Result<ValidTag, TagError> {
        let epc = required(&self.epc, "epc")?;
        let antenna_port = required(&self.antenna_port, "antennaPort")?;
        let rssi = required(&self.rssi, "rssi")?;
        let time_of_read = required(&self.time_of_read, "timeOfRead")?;

        if epc.is_empty() || !epc.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TagError::InvalidEpc(epc.to_string()));
        }

        let antenna_port = antenna_port
            .trim()
            .parse::<u16>()
            .map_err(|_| TagError::InvalidAntennaPort(antenna_port.to_string()))?;
        let rssi = rssi
            .trim()
            .parse::<i32>()
            .map_err(|_| TagError::InvalidRssi(rssi.to_string()))?;
        let time_of_read_millis = parse_utc_millis(time_of_read)?;

        Ok(ValidTag {
            epc: epc.to_lowercase(),
            antenna_port,
            rssi,
            time_of_read_millis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIME: &str = "2023/06/01 10:00:00.000";

    #[test]
    fn test_valid_tag() {
        let tag = TagEntry::new("7EDA9038051002710002C0AE", "1", "-65", TIME)
            .validate()
            .unwrap();
        assert_eq!(tag.epc, "7eda9038051002710002c0ae");
        assert_eq!(tag.antenna_port, 1);
        assert_eq!(tag.rssi, -65);
        assert_eq!(tag.time_of_read_millis, 1_685_613_600_000);
    }

    #[test]
    fn test_whitespace_around_numbers_is_accepted() {
        let tag = TagEntry::new("AB", " 2 ", " -70", TIME).validate().unwrap();
        assert_eq!(tag.antenna_port, 2);
        assert_eq!(tag.rssi, -70);
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        let full = TagEntry::new("AB", "1", "-65", TIME);

        let mut tag = full.clone();
        tag.epc = None;
        assert_eq!(tag.validate(), Err(TagError::MissingField("epc")));

        let mut tag = full.clone();
        tag.antenna_port = None;
        assert_eq!(tag.validate(), Err(TagError::MissingField("antennaPort")));

        let mut tag = full.clone();
        tag.rssi = None;
        assert_eq!(tag.validate(), Err(TagError::MissingField("rssi")));

        let mut tag = full;
        tag.time_of_read = None;
        assert_eq!(tag.validate(), Err(TagError::MissingField("timeOfRead")));
    }

    #[test]
    fn test_malformed_fields_are_rejected() {
        assert!(matches!(
            TagEntry::new("", "1", "-65", TIME).validate(),
            Err(TagError::InvalidEpc(_))
        ));
        assert!(matches!(
            TagEntry::new("XYZ", "1", "-65", TIME).validate(),
            Err(TagError::InvalidEpc(_))
        ));
        assert!(matches!(
            TagEntry::new("AB", "one", "-65", TIME).validate(),
            Err(TagError::InvalidAntennaPort(_))
        ));
        assert!(matches!(
            TagEntry::new("AB", "1", "strong", TIME).validate(),
            Err(TagError::InvalidRssi(_))
        ));
        assert!(matches!(
            TagEntry::new("AB", "1", "-65.5", TIME).validate(),
            Err(TagError::InvalidRssi(_))
        ));
        assert!(matches!(
            TagEntry::new("AB", "1", "-65", "not a time").validate(),
            Err(TagError::InvalidTimeOfRead(_))
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TagError::MissingField("epc").to_string(),
            "missing field 'epc'"
        );
        assert_eq!(
            TagError::InvalidRssi("x".to_string()).to_string(),
            "invalid RSSI 'x'"
        );
    }
}
