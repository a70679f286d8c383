//! BLE Service and Characteristic UUIDs.
//!
//! Contains the default identifiers of the cue peripheral and the parser
//! for operator-supplied identifiers.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Bluetooth SIG base UUID that 16/32-bit short identifiers expand onto.
pub const BLUETOOTH_BASE_UUID: Uuid = Uuid::from_u128(0x0000_0000_0000_1000_8000_00805f9b34fb);

/// Default cue service UUID (HM-10 style serial service).
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_ffe0_0000_1000_8000_00805f9b34fb);
/// Default cue characteristic UUID (write).
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x0000_ffe1_0000_1000_8000_00805f9b34fb);

/// Label used when the selected device advertises no name.
pub const DEFAULT_DEVICE_NAME: &str = "BLE Device";

/// Expand a 16 or 32-bit assigned number onto the Bluetooth base UUID.
pub fn from_short(short: u32) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID.as_u128() | ((short as u128) << 96))
}

/// Parse an operator-supplied service or characteristic identifier.
///
/// Accepts the full 128-bit form (`0000ffe0-0000-1000-8000-00805f9b34fb`)
/// and the short 16/32-bit forms (`ffe0`, `0xFFE0`). `name` is used in the
/// error to say which field was malformed.
pub fn parse_identifier(name: &str, value: &str) -> Result<Uuid> {
    let trimmed = value.trim();
    let invalid = || Error::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let short = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if matches!(short.len(), 4 | 8) && short.chars().all(|c| c.is_ascii_hexdigit()) {
        let value = u32::from_str_radix(short, 16).map_err(|_| invalid())?;
        return Ok(from_short(value));
    }

    Uuid::parse_str(trimmed).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uuid_format() {
        assert_eq!(
            DEFAULT_SERVICE_UUID.to_string(),
            "0000ffe0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            DEFAULT_CHARACTERISTIC_UUID.to_string(),
            "0000ffe1-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_from_short() {
        assert_eq!(from_short(0xffe0), DEFAULT_SERVICE_UUID);
        assert_eq!(from_short(0xffe1), DEFAULT_CHARACTERISTIC_UUID);
    }

    #[test]
    fn test_parse_full_identifier() {
        let uuid = parse_identifier("service", "0000FFE0-0000-1000-8000-00805F9B34FB").unwrap();
        assert_eq!(uuid, DEFAULT_SERVICE_UUID);

        let uuid = parse_identifier("service", "  0000ffe1-0000-1000-8000-00805f9b34fb ").unwrap();
        assert_eq!(uuid, DEFAULT_CHARACTERISTIC_UUID);
    }

    #[test]
    fn test_parse_short_identifier() {
        assert_eq!(
            parse_identifier("service", "ffe0").unwrap(),
            DEFAULT_SERVICE_UUID
        );
        assert_eq!(
            parse_identifier("service", "0xFFE1").unwrap(),
            DEFAULT_CHARACTERISTIC_UUID
        );
        assert_eq!(
            parse_identifier("service", "0000ffe0").unwrap(),
            DEFAULT_SERVICE_UUID
        );
    }

    #[test]
    fn test_parse_invalid_identifier() {
        for bad in ["", "   ", "xyz", "ffe", "0000ffe0-0000", "not-a-uuid"] {
            match parse_identifier("characteristic", bad) {
                Err(Error::InvalidParameter { name, value }) => {
                    assert_eq!(name, "characteristic");
                    assert_eq!(value, bad);
                }
                other => panic!("expected InvalidParameter for {:?}, got {:?}", bad, other),
            }
        }
    }
}
