use mcuwire_frame::RESP_DHT20;
use serde::{Deserialize, Serialize};

use crate::sensor::SensorLayout;

/// Protocol engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Frame type whose payload is decoded as a sensor reading.
    pub sensor_response_type: u8,
    /// Byte layout of the sensor payload.
    pub sensor_layout: SensorLayout,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensor_response_type: RESP_DHT20,
            sensor_layout: SensorLayout::StatusLast,
        }
    }
}
