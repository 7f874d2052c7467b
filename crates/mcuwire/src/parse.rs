//! Argument parsers shared by subcommands and the bridge's stdin commands.

use std::ops::Deref;

/// Bytes given on the command line as hex (`1a2b`, `0x1A2B`, `AA 55 01`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl Deref for HexBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

pub fn parse_hex(input: &str) -> Result<HexBytes, String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits)
        .map(HexBytes)
        .map_err(|err| format!("invalid hex {input:?}: {err}"))
}

/// Integer in decimal or `0x` hex, wider than a byte.
pub fn parse_wide(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input:?}"))
}

pub fn parse_byte(input: &str) -> Result<u8, String> {
    let value = parse_wide(input)?;
    u8::try_from(value).map_err(|_| format!("value out of byte range: {input:?}"))
}
