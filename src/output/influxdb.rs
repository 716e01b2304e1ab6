//! InfluxDB line protocol output formatter.

use crate::output::OutputFormatter;
use crate::raddec::Raddec;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

/// Field values for InfluxDB line protocol
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    #[allow(dead_code)] // Used in tests
    String(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Integer(num) => write!(f, "{num}i"),
            FieldValue::String(s) => write!(f, "\"{}\"", escape(s, &['"', '\\'])),
        }
    }
}

const MEASUREMENT_SPECIAL: &[char] = &[',', ' '];
const KEY_SPECIAL: &[char] = &[',', '=', ' '];

/// Backslash-escape every character of `special` in `value`.
fn escape<'a>(value: &'a str, special: &[char]) -> Cow<'a, str> {
    if !value.contains(special) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<String, String>,
    pub field_set: BTreeMap<String, FieldValue>,
    /// Epoch milliseconds, written as nanoseconds
    pub timestamp_millis: Option<i64>,
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", escape(&self.measurement, MEASUREMENT_SPECIAL))?;
        for (key, value) in &self.tag_set {
            write!(
                fmt,
                ",{}={}",
                escape(key, KEY_SPECIAL),
                escape(value, KEY_SPECIAL)
            )?;
        }

        let mut separator = " ";
        for (key, value) in &self.field_set {
            write!(fmt, "{separator}{}={value}", escape(key, KEY_SPECIAL))?;
            separator = ",";
        }

        if let Some(millis) = self.timestamp_millis {
            write!(fmt, " {}", i128::from(millis) * 1_000_000)?;
        }
        Ok(())
    }
}

/// InfluxDB line protocol formatter.
///
/// Writes one point per decoding, tagged with the transmitter and receiver
/// identities and carrying the RSSI as an integer field.
pub struct InfluxDbFormatter {
    measurement_name: String,
}

impl InfluxDbFormatter {
    pub fn new(measurement_name: impl Into<String>) -> Self {
        Self {
            measurement_name: measurement_name.into(),
        }
    }

    fn data_points<'a>(&'a self, raddec: &'a Raddec) -> impl Iterator<Item = DataPoint> + 'a {
        raddec.rssi_signature.iter().map(move |decoding| {
            let mut tags = BTreeMap::new();
            tags.insert("transmitter_id".to_string(), raddec.transmitter_id.clone());
            tags.insert(
                "transmitter_id_type".to_string(),
                raddec.transmitter_id_type.to_string(),
            );
            // Empty tag values are not valid line protocol
            if !decoding.receiver_id.is_empty() {
                tags.insert("receiver_id".to_string(), decoding.receiver_id.clone());
            }
            tags.insert(
                "receiver_id_type".to_string(),
                decoding.receiver_id_type.to_string(),
            );

            let mut fields = BTreeMap::new();
            fields.insert("rssi".to_string(), FieldValue::Integer(decoding.rssi.into()));

            DataPoint {
                measurement: self.measurement_name.clone(),
                tag_set: tags,
                field_set: fields,
                timestamp_millis: Some(raddec.timestamp),
            }
        })
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn write_raddec(&self, raddec: &Raddec, out: &mut dyn Write) -> io::Result<()> {
        for point in self.data_points(raddec) {
            writeln!(out, "{point}")?;
        }
        Ok(())
    }
}
