//! Structured tag-read payloads as delivered by CSL readers.
//!
//! Deserialisation is deliberately forgiving: a field of the wrong JSON type
//! is treated as absent, a `tags` value that is not an array is treated as
//! empty, and a tags element that is not an object becomes an entry with no
//! fields. Deciding whether a tag is usable is left to `TagEntry::validate`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReadPayload {
    #[serde(
        rename = "pcEthernetMACAddress",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pc_ethernet_mac_address: Option<String>,
    #[serde(
        rename = "pcWiFiMACAddress",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pc_wifi_mac_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<TagEntry>,
}

/// One tag read, with every field still unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEntry {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub epc: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub antenna_port: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub rssi: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_of_read: Option<String>,
}

impl TagEntry {
    /// Build an entry with all four fields present.
    pub fn new(
        epc: impl Into<String>,
        antenna_port: impl Into<String>,
        rssi: impl Into<String>,
        time_of_read: impl Into<String>,
    ) -> Self {
        Self {
            epc: Some(epc.into()),
            antenna_port: Some(antenna_port.into()),
            rssi: Some(rssi.into()),
            time_of_read: Some(time_of_read.into()),
        }
    }
}

/// Opaque per-call configuration, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodingOptions(pub BTreeMap<String, Value>);

impl DecodingOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strings pass through, numbers keep their textual form, anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn tags_or_empty<'de, D>(deserializer: D) -> Result<Vec<TagEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| TagEntry::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}
