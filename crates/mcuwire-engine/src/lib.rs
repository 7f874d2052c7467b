//! Protocol engine for a framed microcontroller link.
//!
//! [`ProtocolEngine`] owns one inbound [`FrameDecoder`](mcuwire_frame::FrameDecoder),
//! turns decoded frames into [`Notification`]s (with DHT20 sensor payloads
//! decoded on the way), and encodes outbound commands onto whatever
//! [`Transport`](mcuwire_transport::Transport) is currently attached.
//!
//! ```
//! use mcuwire_engine::{EngineConfig, Notification, ProtocolEngine};
//! use mcuwire_transport::StreamTransport;
//!
//! let mut engine = ProtocolEngine::new(EngineConfig::default(), Vec::<Notification>::new());
//! engine.attach(StreamTransport::new(Vec::new()));
//! assert!(engine.request_sensor());
//! assert_eq!(
//!     engine.transport().unwrap().get_ref().as_slice(),
//!     &[0xAA, 0x55, 0x01, 0x10, 0x0A, 0x02, 0x1A, 0x2B, 0x62],
//! );
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod sensor;

pub use config::EngineConfig;
pub use engine::ProtocolEngine;
pub use error::{EngineError, Result};
pub use notify::{Notification, NotificationSink};
pub use sensor::{RawSensor, SensorLayout, SensorReading, SENSOR_PAYLOAD_LEN};
