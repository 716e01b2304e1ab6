use crate::decoder::{PayloadHandler, RaddecSink};
use crate::payload::{DecodingOptions, TagEntry, TagReadPayload};
use crate::raddec::Raddec;
use std::sync::Mutex;
use std::time::SystemTime;

/// A stable Ethernet address for unit tests.
pub const TEST_MAC: &str = "AABBCCDDEEFF";

/// Build a payload from `TEST_MAC` in UTC carrying the given tags.
pub fn payload_with_tags(tags: Vec<TagEntry>) -> TagReadPayload {
    TagReadPayload {
        pc_ethernet_mac_address: Some(TEST_MAC.to_string()),
        pc_wifi_mac_address: Some(String::new()),
        time_zone: Some("0:00".to_string()),
        tags,
    }
}

/// Sink that keeps every raddec it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    raddecs: Mutex<Vec<Raddec>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<Raddec> {
        std::mem::take(&mut *self.raddecs.lock().unwrap())
    }
}

impl RaddecSink for RecordingSink {
    fn accept(&self, raddec: Raddec) {
        self.raddecs.lock().unwrap().push(raddec);
    }
}

/// A payload handed to a [`PayloadHandler`], with its call arguments.
#[derive(Debug, Clone)]
pub struct HandledPayload {
    pub payload: TagReadPayload,
    pub origin: String,
    pub capture_time: SystemTime,
    pub decoding_options: DecodingOptions,
}

/// Handler that forwards every call to a channel instead of decoding.
#[derive(Debug)]
pub struct ChannelHandler(pub tokio::sync::mpsc::UnboundedSender<HandledPayload>);

impl PayloadHandler for ChannelHandler {
    fn handle_data(
        &self,
        payload: &TagReadPayload,
        origin: &str,
        capture_time: SystemTime,
        decoding_options: &DecodingOptions,
    ) {
        let _ = self.0.send(HandledPayload {
            payload: payload.clone(),
            origin: origin.to_string(),
            capture_time,
            decoding_options: decoding_options.clone(),
        });
    }
}
