//! Decoder for CSL tag-read payloads.
//!
//! [`CslDecoder`] turns one structured payload into zero or more raddecs and
//! hands each to a [`RaddecSink`], in the order the tags appear. The
//! transform keeps no state between calls and never fails: tags that do not
//! validate are dropped and logged at debug level.

use crate::identifier::{ReceiverIdentity, resolve_receiver};
use crate::payload::{DecodingOptions, TagReadPayload};
use crate::raddec::{Decoding, IdentifierType, Raddec};
use crate::timezone::{TimeZoneOffset, parse_time_zone};
use std::time::SystemTime;
use tokio::sync::mpsc;

/// Consumer of finished raddecs.
pub trait RaddecSink: Send + Sync {
    fn accept(&self, raddec: Raddec);
}

impl<F> RaddecSink for F
where
    F: Fn(Raddec) + Send + Sync,
{
    fn accept(&self, raddec: Raddec) {
        self(raddec)
    }
}

impl RaddecSink for mpsc::UnboundedSender<Raddec> {
    fn accept(&self, raddec: Raddec) {
        if let Err(e) = self.send(raddec) {
            log::warn!("raddec receiver closed, dropping {}", e.0.transmitter_id);
        }
    }
}

/// Anything that can take a reader payload, such as [`CslDecoder`].
///
/// This is the seam the simulated source drives, so tests can substitute a
/// recording handler.
pub trait PayloadHandler: Send + Sync {
    fn handle_data(
        &self,
        payload: &TagReadPayload,
        origin: &str,
        capture_time: SystemTime,
        decoding_options: &DecodingOptions,
    );
}

/// Decodes payloads from one or more CSL readers and forwards the raddecs.
#[derive(Debug)]
pub struct CslDecoder<S> {
    sink: S,
}

impl<S: RaddecSink> CslDecoder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: RaddecSink> PayloadHandler for CslDecoder<S> {
    fn handle_data(
        &self,
        payload: &TagReadPayload,
        origin: &str,
        capture_time: SystemTime,
        decoding_options: &DecodingOptions,
    ) {
        log::trace!(
            "payload from {origin} captured at {capture_time:?} with {} tag(s), options {decoding_options:?}",
            payload.tags.len()
        );

        for raddec in process_tag_data(payload) {
            self.sink.accept(raddec);
        }
    }
}

/// Decode every valid tag of a payload into a raddec, preserving tag order.
///
/// The receiver identity and time zone correction are resolved once and
/// shared by all records. A malformed time zone invalidates every tag of the
/// payload, since none of their timestamps could be corrected.
pub fn process_tag_data(payload: &TagReadPayload) -> Vec<Raddec> {
    let receiver = resolve_receiver(
        payload.pc_ethernet_mac_address.as_deref(),
        payload.pc_wifi_mac_address.as_deref(),
    );

    let offset = match payload.time_zone.as_deref().map(str::trim) {
        None | Some("") => TimeZoneOffset::UTC,
        Some(zone) => match parse_time_zone(zone) {
            Ok(offset) => offset,
            Err(e) => {
                log::warn!(
                    "dropping {} tag(s) from {}: {e}",
                    payload.tags.len(),
                    display_receiver(&receiver)
                );
                return Vec::new();
            }
        },
    };

    payload
        .tags
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry.validate() {
            Ok(tag) => {
                let mut raddec = Raddec::new(
                    tag.epc,
                    IdentifierType::Epc96,
                    tag.time_of_read_millis + offset.millis(),
                );
                raddec.add_decoding(Decoding {
                    receiver_id: receiver.id.clone(),
                    receiver_id_type: receiver.id_type,
                    rssi: tag.rssi,
                });
                Some(raddec)
            }
            Err(e) => {
                log::debug!("skipping tag {index}: {e}");
                None
            }
        })
        .collect()
}

fn display_receiver(receiver: &ReceiverIdentity) -> &str {
    if receiver.id.is_empty() {
        "unknown receiver"
    } else {
        &receiver.id
    }
}
