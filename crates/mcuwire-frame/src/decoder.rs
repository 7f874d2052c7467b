use bytes::Bytes;
use tracing::{debug, trace};

use crate::checksum::Checksum;
use crate::codec::{Frame, PAYLOAD_MAX, PREAMBLE};

/// Outcome of a completed frame on the receive side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A frame whose trailing byte matched the accumulated checksum.
    FrameReady(Frame),
    /// A frame was read to the end but its checksum did not match.
    /// Informational: decoding continues with the next byte.
    ChecksumMismatch { expected: u8, received: u8 },
}

/// Receive state. Every variant handles every byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    WaitPreamble1,
    WaitPreamble2,
    ReadVersion,
    ReadType,
    ReadId,
    ReadLen,
    ReadPayload,
    ReadChecksum,
}

/// Incremental, preamble-synchronized frame decoder.
///
/// Feed it bytes in chunks of any size; partial frames are carried across
/// calls. One decoder belongs to exactly one link connection. Drop it (or
/// call [`reset`](Self::reset)) when the link changes.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    version: u8,
    frame_type: u8,
    id: u8,
    len: usize,
    payload: [u8; PAYLOAD_MAX],
    cursor: usize,
    checksum: Checksum,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecodeState::WaitPreamble1,
            version: 0,
            frame_type: 0,
            id: 0,
            len: 0,
            payload: [0u8; PAYLOAD_MAX],
            cursor: 0,
            checksum: Checksum::new(),
        }
    }

    /// Current receive state.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True when no frame is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::WaitPreamble1
    }

    /// Discard any partial frame and return to preamble scanning.
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitPreamble1;
        self.version = 0;
        self.frame_type = 0;
        self.id = 0;
        self.len = 0;
        self.cursor = 0;
        self.checksum.reset();
    }

    /// Consume a chunk and return every event it completes, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        bytes.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    /// Advance the state machine by one byte.
    pub fn push(&mut self, byte: u8) -> Option<DecodeEvent> {
        match self.state {
            DecodeState::WaitPreamble1 => {
                if byte == PREAMBLE[0] {
                    self.state = DecodeState::WaitPreamble2;
                }
                None
            }
            DecodeState::WaitPreamble2 => {
                self.state = if byte == PREAMBLE[1] {
                    DecodeState::ReadVersion
                } else if byte == PREAMBLE[0] {
                    DecodeState::WaitPreamble2
                } else {
                    DecodeState::WaitPreamble1
                };
                None
            }
            DecodeState::ReadVersion => {
                self.version = byte;
                self.checksum = Checksum::start(byte);
                self.state = DecodeState::ReadType;
                None
            }
            DecodeState::ReadType => {
                self.frame_type = byte;
                self.checksum.push(byte);
                self.state = DecodeState::ReadId;
                None
            }
            DecodeState::ReadId => {
                self.id = byte;
                self.checksum.push(byte);
                self.state = DecodeState::ReadLen;
                None
            }
            DecodeState::ReadLen => {
                self.len = byte as usize;
                self.checksum.push(byte);
                if self.len == 0 {
                    self.state = DecodeState::ReadChecksum;
                } else if self.len > PAYLOAD_MAX {
                    debug!(
                        len = self.len,
                        max = PAYLOAD_MAX,
                        "oversized length; resyncing"
                    );
                    self.reset();
                } else {
                    self.cursor = 0;
                    self.state = DecodeState::ReadPayload;
                }
                None
            }
            DecodeState::ReadPayload => {
                self.payload[self.cursor] = byte;
                self.cursor += 1;
                self.checksum.push(byte);
                if self.cursor >= self.len {
                    self.state = DecodeState::ReadChecksum;
                }
                None
            }
            DecodeState::ReadChecksum => {
                let expected = self.checksum.value();
                let event = if byte == expected {
                    let frame = Frame {
                        version: self.version,
                        frame_type: self.frame_type,
                        id: self.id,
                        payload: Bytes::copy_from_slice(&self.payload[..self.len]),
                        checksum: byte,
                    };
                    trace!(
                        frame_type = frame.frame_type,
                        id = frame.id,
                        len = self.len,
                        "frame complete"
                    );
                    DecodeEvent::FrameReady(frame)
                } else {
                    DecodeEvent::ChecksumMismatch {
                        expected,
                        received: byte,
                    }
                };
                self.reset();
                Some(event)
            }
        }
    }
}
