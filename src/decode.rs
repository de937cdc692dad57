//! Field decoding for module attributes.
//!
//! Both decoders are total: malformed input becomes a value that renders as
//! an inline marker instead of an error.

use std::fmt;

/// Printed in place of the whole address when any component is not hex.
pub const INVALID_ADDRESS: &str = "ERROR: Invalid Address";
/// Printed when a module has no memory snapshot.
pub const NO_SNAPSHOT: &str = "N/A";
/// Printed when a snapshot contains characters outside `[0-9A-Fa-f]`.
pub const NON_HEX_SNAPSHOT: &str = "Error: Non-hex characters";

/// A module address, one decimal value per comma-separated hex component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Decimal digit strings, in the original component order.
    Decimal(Vec<String>),
    Invalid,
}

impl Address {
    /// Decode `"1A,0B"` into `26,11`. A missing attribute is invalid.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Address::Invalid;
        };
        raw.split(',')
            .map(hex_to_decimal)
            .collect::<Option<Vec<_>>>()
            .map_or(Address::Invalid, Address::Decimal)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Address::Decimal(_))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Decimal(parts) => f.write_str(&parts.join(",")),
            Address::Invalid => f.write_str(INVALID_ADDRESS),
        }
    }
}

/// Convert one hex component to decimal without an upper bound on size.
///
/// Digits are accumulated little-endian in base 10 so that components wider
/// than any machine integer still convert exactly.
fn hex_to_decimal(component: &str) -> Option<String> {
    let digits = component.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    if digits.is_empty() {
        return None;
    }

    let mut decimal: Vec<u8> = vec![0];
    for c in digits.chars() {
        let mut carry = c.to_digit(16)?;
        for d in decimal.iter_mut() {
            let v = u32::from(*d) * 16 + carry;
            *d = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            decimal.push((carry % 10) as u8);
            carry /= 10;
        }
    }

    Some(decimal.iter().rev().map(|d| char::from(b'0' + d)).collect())
}

/// A module memory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Absent,
    /// Hex text with an odd number of characters; holds that count.
    OddLength(usize),
    NonHex,
    Bytes(Vec<u8>),
}

impl Snapshot {
    /// Decode snapshot hex text. Blank text counts as absent.
    pub fn parse(raw: Option<&str>) -> Self {
        let hex_text = match raw.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Snapshot::Absent,
        };

        let len = hex_text.chars().count();
        if len % 2 != 0 {
            return Snapshot::OddLength(len);
        }

        match hex::decode(hex_text) {
            Ok(bytes) => Snapshot::Bytes(bytes),
            Err(_) => Snapshot::NonHex,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Snapshot::OddLength(_) | Snapshot::NonHex)
    }

    /// Printable ASCII rendering; bytes outside 32..=126 become `.`.
    pub fn to_ascii(&self) -> String {
        match self {
            Snapshot::Absent => NO_SNAPSHOT.to_string(),
            Snapshot::OddLength(len) => format!("Error: Odd length ({len})"),
            Snapshot::NonHex => NON_HEX_SNAPSHOT.to_string(),
            Snapshot::Bytes(bytes) => bytes
                .iter()
                .map(|&b| if (32..=126).contains(&b) { char::from(b) } else { '.' })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_two_components() {
        let addr = Address::parse(Some("1A,0B"));
        assert_eq!(addr.to_string(), "26,11");
        assert!(addr.is_valid());
    }

    #[test]
    fn test_address_single_component() {
        assert_eq!(Address::parse(Some("FF")).to_string(), "255");
        assert_eq!(Address::parse(Some("00")).to_string(), "0");
    }

    #[test]
    fn test_address_whitespace_and_prefix() {
        assert_eq!(Address::parse(Some(" 0x10 , 2a")).to_string(), "16,42");
    }

    #[test]
    fn test_address_wider_than_u128() {
        // 2^128 = 0x1 followed by 32 zeros
        let raw = format!("1{}", "0".repeat(32));
        assert_eq!(
            Address::parse(Some(&raw)).to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn test_address_invalid_component_poisons_all() {
        let addr = Address::parse(Some("1A,ZZ"));
        assert_eq!(addr, Address::Invalid);
        assert_eq!(addr.to_string(), INVALID_ADDRESS);
    }

    #[test]
    fn test_address_missing_or_empty() {
        assert_eq!(Address::parse(None), Address::Invalid);
        assert_eq!(Address::parse(Some("")), Address::Invalid);
        assert_eq!(Address::parse(Some("1A,")), Address::Invalid);
    }

    #[test]
    fn test_snapshot_hello() {
        let snap = Snapshot::parse(Some("48656C6C6F"));
        assert_eq!(snap.to_ascii(), "Hello");
        assert!(!snap.is_error());
    }

    #[test]
    fn test_snapshot_non_printable_becomes_dot() {
        assert_eq!(Snapshot::parse(Some("00417F20")).to_ascii(), ".A. ");
    }

    #[test]
    fn test_snapshot_absent() {
        assert_eq!(Snapshot::parse(None).to_ascii(), "N/A");
        assert_eq!(Snapshot::parse(Some("   ")).to_ascii(), "N/A");
    }

    #[test]
    fn test_snapshot_odd_length() {
        let snap = Snapshot::parse(Some("ABC"));
        assert_eq!(snap, Snapshot::OddLength(3));
        assert!(snap.to_ascii().contains('3'));
        assert!(snap.is_error());
    }

    #[test]
    fn test_snapshot_non_hex() {
        let snap = Snapshot::parse(Some("4G"));
        assert_eq!(snap, Snapshot::NonHex);
        assert_eq!(snap.to_ascii(), NON_HEX_SNAPSHOT);
    }

    #[test]
    fn test_snapshot_trimmed_before_length_check() {
        assert_eq!(Snapshot::parse(Some("\n  4142\n")).to_ascii(), "AB");
    }
}
