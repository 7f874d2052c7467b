//! DHT20 sensor payload decoding.
//!
//! The firmware packs two 20-bit big-endian fields into five bytes, sharing
//! the middle byte (humidity takes its high nibble, temperature the low one),
//! plus one status byte:
//!
//! ```text
//! StatusLast:  [H19..H12] [H11..H4] [H3..H0|T19..T16] [T15..T8] [T7..T0] [status]
//! StatusFirst: [status] [H19..H12] [H11..H4] [H3..H0|T19..T16] [T15..T8] [T7..T0]
//! ```

use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use crate::error::{EngineError, Result};

/// Bytes consumed by the sensor layout.
pub const SENSOR_PAYLOAD_LEN: usize = 6;

const FIELD_MASK: u32 = 0xF_FFFF;
const FULL_SCALE: f64 = 1_048_576.0;

/// Where the status byte sits relative to the measurement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorLayout {
    /// Fields in bytes 0..5, status in byte 5.
    #[default]
    StatusLast,
    /// Status in byte 0, fields in bytes 1..6.
    StatusFirst,
}

/// Undecoded 20-bit fields of one sensor payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSensor {
    pub humidity: u32,
    pub temperature: u32,
    pub status: u8,
}

impl RawSensor {
    /// Unpack the fixed layout. Fails only when fewer than six bytes are given;
    /// bytes past the sixth are ignored.
    pub fn unpack(payload: &[u8], layout: SensorLayout) -> Result<Self> {
        if payload.len() < SENSOR_PAYLOAD_LEN {
            return Err(EngineError::InsufficientPayload {
                len: payload.len(),
                required: SENSOR_PAYLOAD_LEN,
            });
        }

        let (fields, status) = match layout {
            SensorLayout::StatusLast => (&payload[0..5], payload[5]),
            SensorLayout::StatusFirst => (&payload[1..6], payload[0]),
        };
        let [b0, b1, b2, b3, b4] = [fields[0], fields[1], fields[2], fields[3], fields[4]]
            .map(u32::from);

        Ok(Self {
            humidity: ((b0 << 12) | (b1 << 4) | (b2 >> 4)) & FIELD_MASK,
            temperature: (((b2 & 0x0F) << 16) | (b3 << 8) | b4) & FIELD_MASK,
            status,
        })
    }

    /// Relative humidity in percent, rounded to two decimals.
    pub fn humidity_pct(&self) -> f64 {
        round2(f64::from(self.humidity) * 100.0 / FULL_SCALE)
    }

    /// Temperature in °C, rounded to two decimals.
    pub fn temperature_c(&self) -> f64 {
        round2(f64::from(self.temperature) * 200.0 / FULL_SCALE - 50.0)
    }
}

/// One decoded environmental reading.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    #[serde(rename = "humidity", serialize_with = "fixed2")]
    pub humidity_pct: f64,
    #[serde(rename = "temperature", serialize_with = "fixed2")]
    pub temperature_c: f64,
    #[serde(serialize_with = "status_hex")]
    pub status: u8,
    /// Host time at decode; nothing on the wire carries a timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl SensorReading {
    /// Decode a sensor payload, stamping it with the current time.
    pub fn decode(payload: &[u8], layout: SensorLayout) -> Result<Self> {
        Self::decode_at(payload, layout, OffsetDateTime::now_utc())
    }

    /// Decode a sensor payload with an explicit timestamp.
    pub fn decode_at(
        payload: &[u8],
        layout: SensorLayout,
        timestamp: OffsetDateTime,
    ) -> Result<Self> {
        let raw = RawSensor::unpack(payload, layout)?;
        Ok(Self {
            humidity_pct: raw.humidity_pct(),
            temperature_c: raw.temperature_c(),
            status: raw.status,
            timestamp,
        })
    }

    /// Decode a hex-encoded payload such as `"800008000a1c"`.
    pub fn from_hex(input: &str, layout: SensorLayout) -> Result<Self> {
        let payload = hex::decode(input.trim())?;
        Self::decode(&payload, layout)
    }

    /// Status byte as `0x` + two lowercase hex digits.
    pub fn status_hex(&self) -> String {
        format!("0x{:02x}", self.status)
    }

    /// Equality over the measured values, ignoring capture time.
    pub fn same_measurement(&self, other: &Self) -> bool {
        self.humidity_pct == other.humidity_pct
            && self.temperature_c == other.temperature_c
            && self.status == other.status
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn fixed2<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

fn status_hex<S: Serializer>(status: &u8, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{status:02x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_payload() {
        let reading = SensorReading::decode(&[0; 6], SensorLayout::StatusLast).unwrap();
        assert_eq!(reading.humidity_pct, 0.0);
        assert_eq!(reading.temperature_c, -50.0);
        assert_eq!(reading.status_hex(), "0x00");
    }

    #[test]
    fn mid_scale_status_last() {
        let reading =
            SensorReading::decode(&[0x80, 0x00, 0x08, 0x00, 0x00, 0x1C], SensorLayout::StatusLast)
                .unwrap();
        assert_eq!(reading.humidity_pct, 50.0);
        assert_eq!(reading.temperature_c, 50.0);
        assert_eq!(reading.status, 0x1C);
        assert_eq!(reading.status_hex(), "0x1c");
    }

    #[test]
    fn mid_scale_status_first() {
        let reading =
            SensorReading::decode(&[0x1C, 0x80, 0x00, 0x08, 0x00, 0x00], SensorLayout::StatusFirst)
                .unwrap();
        assert_eq!(reading.humidity_pct, 50.0);
        assert_eq!(reading.temperature_c, 50.0);
        assert_eq!(reading.status, 0x1C);
    }

    #[test]
    fn layouts_are_not_interchangeable() {
        let payload = [0x1C, 0x80, 0x00, 0x08, 0x00, 0x00];
        let last = RawSensor::unpack(&payload, SensorLayout::StatusLast).unwrap();
        let first = RawSensor::unpack(&payload, SensorLayout::StatusFirst).unwrap();
        assert_ne!(last, first);
    }

    #[test]
    fn shared_nibble_splits_between_fields() {
        let raw = RawSensor::unpack(&[0x00, 0x00, 0xF0, 0x00, 0x00, 0x00], SensorLayout::StatusLast)
            .unwrap();
        assert_eq!(raw.humidity, 0x0000F);
        assert_eq!(raw.temperature, 0);

        let raw = RawSensor::unpack(&[0x00, 0x00, 0x0F, 0x00, 0x00, 0x00], SensorLayout::StatusLast)
            .unwrap();
        assert_eq!(raw.humidity, 0);
        assert_eq!(raw.temperature, 0xF_0000);
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 0x66666 / 2^20 * 100 = 39.99996...
        let raw = RawSensor {
            humidity: 0x66666,
            temperature: 0x60000,
            status: 0,
        };
        assert_eq!(raw.humidity_pct(), 40.0);
        assert_eq!(raw.temperature_c(), 25.0);
    }

    #[test]
    fn garbage_is_decoded_not_rejected() {
        let reading = SensorReading::decode(&[0xFF; 6], SensorLayout::StatusLast).unwrap();
        assert_eq!(reading.humidity_pct, 100.0);
        assert_eq!(reading.temperature_c, 150.0);
        assert_eq!(reading.status_hex(), "0xff");
    }

    #[test]
    fn extra_bytes_are_ignored() {
        let a =
            SensorReading::decode(&[0x12, 0x34, 0x56, 0x78, 0x9A, 0x01], SensorLayout::StatusLast)
                .unwrap();
        let b = SensorReading::decode(
            &[0x12, 0x34, 0x56, 0x78, 0x9A, 0x01, 0xEE, 0xEE],
            SensorLayout::StatusLast,
        )
        .unwrap();
        assert!(a.same_measurement(&b));
    }

    #[test]
    fn short_payload_fails() {
        let err = SensorReading::decode(&[0; 5], SensorLayout::StatusLast).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientPayload { len: 5, required: 6 }
        ));
    }

    #[test]
    fn decode_is_pure() {
        let payload = [0x5A, 0x3C, 0x71, 0x0F, 0xE2, 0x18];
        let first = SensorReading::decode(&payload, SensorLayout::StatusLast).unwrap();
        let second = SensorReading::decode(&payload, SensorLayout::StatusLast).unwrap();
        assert!(first.same_measurement(&second));
    }

    #[test]
    fn from_hex_accepts_either_case() {
        let lower = SensorReading::from_hex("800008000a1c", SensorLayout::StatusLast).unwrap();
        let upper = SensorReading::from_hex("800008000A1C", SensorLayout::StatusLast).unwrap();
        assert!(lower.same_measurement(&upper));
        assert!(matches!(
            SensorReading::from_hex("zz", SensorLayout::StatusLast),
            Err(EngineError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_fixed_point_strings() {
        let timestamp = OffsetDateTime::UNIX_EPOCH;
        let reading =
            SensorReading::decode_at(&[0; 6], SensorLayout::StatusLast, timestamp).unwrap();
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["humidity"], "0.00");
        assert_eq!(json["temperature"], "-50.00");
        assert_eq!(json["status"], "0x00");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }
}
