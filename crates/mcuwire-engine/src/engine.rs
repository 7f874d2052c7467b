use bytes::Bytes;
use mcuwire_frame::{type_name, Command, DecodeEvent, FrameDecoder, CMD_DHT20, PAYLOAD_MAX};
use mcuwire_transport::Transport;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::notify::{Notification, NotificationSink};
use crate::sensor::SensorReading;

/// Bridges one microcontroller link to a notification sink.
///
/// Inbound chunks go through the engine's own [`FrameDecoder`]; outbound
/// commands are encoded and written straight to the attached transport.
/// The engine is not internally synchronized: whoever services the link
/// owns it (or serializes access to it).
pub struct ProtocolEngine<T, S> {
    config: EngineConfig,
    decoder: FrameDecoder,
    transport: Option<T>,
    sink: S,
    last_reading: Option<SensorReading>,
}

impl<T: Transport, S: NotificationSink> ProtocolEngine<T, S> {
    /// Create an engine with no link attached.
    pub fn new(config: EngineConfig, sink: S) -> Self {
        Self {
            config,
            decoder: FrameDecoder::new(),
            transport: None,
            sink,
            last_reading: None,
        }
    }

    /// Attach a link, replacing any previous one.
    ///
    /// Always starts from a fresh decoder: bytes of a frame begun on an
    /// earlier link can never complete on this one.
    pub fn attach(&mut self, transport: T) {
        self.decoder = FrameDecoder::new();
        self.transport = Some(transport);
        info!("link attached");
        self.sink.notify(Notification::Status { connected: true });
    }

    /// Detach the current link, discarding any partial frame.
    pub fn detach(&mut self) -> Option<T> {
        self.decoder.reset();
        let transport = self.transport.take();
        info!(had_link = transport.is_some(), "link detached");
        self.sink.notify(Notification::Status { connected: false });
        transport
    }

    /// Whether a link is attached and still accepting writes.
    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .is_some_and(|transport| transport.is_available())
    }

    /// Process one chunk from the link to completion.
    ///
    /// Returns the number of frames decoded from the chunk.
    pub fn on_bytes(&mut self, chunk: &[u8]) -> usize {
        let mut frames = 0usize;
        for event in self.decoder.feed(chunk) {
            match event {
                DecodeEvent::FrameReady(frame) => {
                    frames += 1;
                    info!(
                        frame_type = format_args!("0x{:02x}", frame.frame_type),
                        type_name = type_name(frame.frame_type),
                        id = format_args!("0x{:02x}", frame.id),
                        payload = %frame.payload_hex(),
                        "received frame"
                    );
                    self.sink.notify(Notification::frame_received(&frame));

                    if frame.frame_type == self.config.sensor_response_type {
                        match SensorReading::decode(&frame.payload, self.config.sensor_layout) {
                            Ok(reading) => {
                                debug!(
                                    humidity = reading.humidity_pct,
                                    temperature = reading.temperature_c,
                                    status = %reading.status_hex(),
                                    "decoded sensor reading"
                                );
                                self.last_reading = Some(reading.clone());
                                self.sink.notify(Notification::SensorReading(reading));
                            }
                            Err(err) => {
                                warn!(error = %err, id = frame.id, "sensor response not decoded");
                            }
                        }
                    }
                }
                DecodeEvent::ChecksumMismatch { expected, received } => {
                    warn!(
                        expected = format_args!("0x{expected:02x}"),
                        received = format_args!("0x{received:02x}"),
                        "bad frame checksum; frame dropped"
                    );
                    self.sink
                        .notify(Notification::ChecksumMismatch { expected, received });
                }
            }
        }
        frames
    }

    /// Encode and send a command built from its parts.
    ///
    /// Returns whether the link accepted the write.
    pub fn send_command(&mut self, frame_type: u8, id: u8, payload: impl Into<Bytes>) -> bool {
        if frame_type == CMD_DHT20 {
            warn!("sending CMD_DHT20 (0x10) through the generic send path");
        }
        self.send(&Command::new(frame_type, id, payload))
    }

    /// Send the canned DHT20 measurement request.
    pub fn request_sensor(&mut self) -> bool {
        self.send(&Command::request_sensor())
    }

    /// Encode and send a prepared command. Returns whether the link accepted
    /// the write.
    ///
    /// Payloads over 128 bytes violate the wire format; they are sent as-is
    /// and the firmware will drop them.
    pub fn send(&mut self, command: &Command) -> bool {
        if command.payload.len() > PAYLOAD_MAX {
            warn!(
                len = command.payload.len(),
                max = PAYLOAD_MAX,
                "payload exceeds wire maximum"
            );
        }
        let wire = command.encode();
        let accepted = self.write(&wire);
        if accepted {
            info!(
                frame_type = format_args!("0x{:02x}", command.frame_type),
                id = format_args!("0x{:02x}", command.id),
                wire = %hex::encode_upper(&wire),
                "sent frame"
            );
        }
        accepted
    }

    /// Write bytes to the link without framing.
    pub fn send_raw(&mut self, bytes: &[u8]) -> bool {
        let accepted = self.write(bytes);
        if accepted {
            info!(wire = %hex::encode_upper(bytes), "sent raw bytes");
        }
        accepted
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            warn!("no link attached; write rejected");
            return false;
        };
        match transport.write_bytes(bytes) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "link rejected write");
                false
            }
        }
    }

    /// Most recent sensor reading decoded on any link.
    pub fn last_reading(&self) -> Option<&SensorReading> {
        self.last_reading.as_ref()
    }

    /// What a newly connected observer needs to catch up: the last reading
    /// (if any) followed by the current link status.
    pub fn snapshot(&self) -> Vec<Notification> {
        let mut out = Vec::with_capacity(2);
        if let Some(reading) = &self.last_reading {
            out.push(Notification::SensorReading(reading.clone()));
        }
        out.push(Notification::Status {
            connected: self.is_connected(),
        });
        out
    }

    /// Borrow the decoder (e.g. to inspect its state).
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Borrow the attached transport.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use mcuwire_frame::{DecodeState, RESP_DHT20, RESP_STATUS};
    use mcuwire_transport::{StreamTransport, TransportError};

    use super::*;
    use crate::sensor::SensorLayout;

    type TestEngine = ProtocolEngine<StreamTransport<Vec<u8>>, Vec<Notification>>;

    fn engine() -> TestEngine {
        let mut engine = ProtocolEngine::new(EngineConfig::default(), Vec::new());
        engine.attach(StreamTransport::new(Vec::new()));
        engine.sink_mut().clear();
        engine
    }

    fn wire(frame_type: u8, id: u8, payload: &[u8]) -> Vec<u8> {
        Command::new(frame_type, id, payload.to_vec()).encode().to_vec()
    }

    #[test]
    fn frame_then_sensor_reading_in_order() {
        let mut engine = engine();
        let payload = [0x80, 0x00, 0x08, 0x00, 0x00, 0x1C];
        let frames = engine.on_bytes(&wire(RESP_DHT20, 0x0A, &payload));
        assert_eq!(frames, 1);

        let sink = engine.sink();
        assert_eq!(sink.len(), 2);
        match &sink[0] {
            Notification::FrameReceived {
                frame_type,
                id,
                payload_hex,
                ..
            } => {
                assert_eq!(*frame_type, RESP_DHT20);
                assert_eq!(*id, 0x0A);
                assert_eq!(payload_hex, "80000800001C");
            }
            other => panic!("unexpected {other:?}"),
        }
        match &sink[1] {
            Notification::SensorReading(reading) => {
                assert_eq!(reading.humidity_pct, 50.0);
                assert_eq!(reading.temperature_c, 50.0);
                assert_eq!(reading.status_hex(), "0x1c");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(engine.last_reading().is_some());
    }

    #[test]
    fn non_sensor_frames_only_notify_frame() {
        let mut engine = engine();
        engine.on_bytes(&wire(RESP_STATUS, 0x01, &[0x00]));
        assert_eq!(engine.sink().len(), 1);
        assert_eq!(engine.sink()[0].kind(), "packet");
        assert!(engine.last_reading().is_none());
    }

    #[test]
    fn short_sensor_payload_still_notifies_frame() {
        let mut engine = engine();
        engine.on_bytes(&wire(RESP_DHT20, 0x01, &[0x01, 0x02]));
        assert_eq!(engine.sink().len(), 1);
        assert_eq!(engine.sink()[0].kind(), "packet");
    }

    #[test]
    fn configurable_sensor_type_and_layout() {
        let config = EngineConfig {
            sensor_response_type: 0x30,
            sensor_layout: SensorLayout::StatusFirst,
        };
        let mut engine: TestEngine = ProtocolEngine::new(config, Vec::new());
        engine.on_bytes(&wire(0x30, 0x01, &[0x1C, 0x80, 0x00, 0x08, 0x00, 0x00]));
        match &engine.sink()[1] {
            Notification::SensorReading(reading) => assert_eq!(reading.status, 0x1C),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn checksum_mismatch_is_forwarded_and_decoding_continues() {
        let mut engine = engine();
        let mut bytes = wire(RESP_STATUS, 0x01, &[0x05]);
        bytes[6] = 0x06;
        bytes.extend(wire(RESP_STATUS, 0x02, &[0x05]));

        assert_eq!(engine.on_bytes(&bytes), 1);
        assert_eq!(engine.sink()[0].kind(), "checksum_mismatch");
        assert_eq!(engine.sink()[1].kind(), "packet");
    }

    #[test]
    fn chunked_delivery_matches_whole_delivery() {
        let mut stream = wire(RESP_DHT20, 1, &[1, 2, 3, 4, 5, 6]);
        stream.extend([0xAA, 0x13]);
        stream.extend(wire(RESP_STATUS, 2, &[]));

        let mut whole = engine();
        whole.on_bytes(&stream);
        let mut chunked = engine();
        for chunk in stream.chunks(3) {
            chunked.on_bytes(chunk);
        }

        let kinds = |e: &TestEngine| e.sink().iter().map(|n| n.kind()).collect::<Vec<_>>();
        assert_eq!(kinds(&whole), kinds(&chunked));
        assert_eq!(kinds(&whole), vec!["packet", "sensor", "packet"]);
    }

    #[test]
    fn send_writes_encoded_frame() {
        let mut engine = engine();
        assert!(engine.send_command(0x10, 0x0A, vec![0x1A, 0x2B]));
        assert_eq!(
            engine.transport().unwrap().get_ref().as_slice(),
            &[0xAA, 0x55, 0x01, 0x10, 0x0A, 0x02, 0x1A, 0x2B, 0x62]
        );
    }

    #[test]
    fn request_sensor_matches_reference_frame() {
        let mut engine = engine();
        assert!(engine.request_sensor());
        assert_eq!(
            engine.transport().unwrap().get_ref().as_slice(),
            &[0xAA, 0x55, 0x01, 0x10, 0x0A, 0x02, 0x1A, 0x2B, 0x62]
        );
    }

    #[test]
    fn send_raw_writes_bytes_verbatim() {
        let mut engine = engine();
        assert!(engine.send_raw(&[0x01, 0x02, 0x03]));
        assert_eq!(
            engine.transport().unwrap().get_ref().as_slice(),
            &[0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn send_without_link_is_rejected() {
        let mut engine: TestEngine = ProtocolEngine::new(EngineConfig::default(), Vec::new());
        assert!(!engine.send_command(0x11, 0x01, Bytes::new()));
        assert!(!engine.send_raw(&[0x00]));
        assert!(!engine.is_connected());
    }

    #[test]
    fn unavailable_transport_rejects_send() {
        let mut engine = ProtocolEngine::new(EngineConfig::default(), Vec::new());
        engine.attach(Unavailable);
        assert!(!engine.is_connected());
        assert!(!engine.send_command(0x11, 0x01, Bytes::new()));
    }

    #[test]
    fn attach_resets_partial_frame() {
        let mut engine = engine();
        let bytes = wire(RESP_STATUS, 0x01, &[1, 2, 3]);
        engine.on_bytes(&bytes[..7]);
        assert_eq!(engine.decoder().state(), DecodeState::ReadPayload);

        engine.attach(StreamTransport::new(Vec::new()));
        assert!(engine.decoder().is_idle());
        assert_eq!(engine.on_bytes(&bytes[7..]), 0);
    }

    #[test]
    fn attach_and_detach_emit_status() {
        let mut engine: TestEngine = ProtocolEngine::new(EngineConfig::default(), Vec::new());
        engine.attach(StreamTransport::new(Vec::new()));
        assert!(engine.is_connected());
        assert!(engine.detach().is_some());
        assert!(!engine.is_connected());

        let statuses: Vec<bool> = engine
            .sink()
            .iter()
            .filter_map(|n| match n {
                Notification::Status { connected } => Some(*connected),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![true, false]);
    }

    #[test]
    fn snapshot_replays_last_reading_then_status() {
        let mut engine = engine();
        assert_eq!(engine.snapshot().len(), 1);

        engine.on_bytes(&wire(RESP_DHT20, 0x01, &[0; 6]));
        engine.on_bytes(&wire(RESP_DHT20, 0x02, &[0x80, 0x00, 0x08, 0x00, 0x00, 0x00]));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.len(), 2);
        match &snapshot[0] {
            Notification::SensorReading(reading) => assert_eq!(reading.humidity_pct, 50.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            snapshot[1],
            Notification::Status { connected: true }
        ));
    }

    struct Unavailable;

    impl Transport for Unavailable {
        fn write_bytes(&mut self, _bytes: &[u8]) -> mcuwire_transport::Result<()> {
            Err(TransportError::Unavailable)
        }

        fn is_available(&self) -> bool {
            false
        }
    }
}
