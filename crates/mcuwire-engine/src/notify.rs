use std::sync::mpsc;

use mcuwire_frame::Frame;
use serde::Serialize;
use time::OffsetDateTime;

use crate::sensor::SensorReading;

/// Something observers of the link should hear about.
///
/// Serialized with a `type` tag; field names follow what browser viewers of
/// the bridge expect (`packetType`, `payloadHex`, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A checksum-valid frame arrived.
    #[serde(rename = "packet")]
    FrameReceived {
        #[serde(rename = "packetVersion")]
        version: u8,
        #[serde(rename = "packetType")]
        frame_type: u8,
        #[serde(rename = "packetId")]
        id: u8,
        #[serde(rename = "payloadHex")]
        payload_hex: String,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    /// A sensor-response frame decoded into a reading.
    #[serde(rename = "sensor")]
    SensorReading(SensorReading),
    /// A frame was dropped because its checksum did not match.
    ChecksumMismatch { expected: u8, received: u8 },
    /// The link was attached or detached.
    Status { connected: bool },
}

impl Notification {
    pub fn frame_received(frame: &Frame) -> Self {
        Self::FrameReceived {
            version: frame.version,
            frame_type: frame.frame_type,
            id: frame.id,
            payload_hex: frame.payload_hex(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Short name used in logs and table output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FrameReceived { .. } => "packet",
            Self::SensorReading(_) => "sensor",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Status { .. } => "status",
        }
    }
}

/// Receiver of engine notifications, in decode order.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Hands notifications to another thread. A hung-up receiver is ignored:
/// nobody is listening, so there is nobody to tell.
impl NotificationSink for mpsc::Sender<Notification> {
    fn notify(&mut self, notification: Notification) {
        let _ = self.send(notification);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}
