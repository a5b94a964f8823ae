//! Common types for the Black Hole environment abstraction.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bomb's serial number.
///
/// Six characters, each an uppercase ASCII letter or a decimal digit,
/// with at least two digits (the generator reads coordinates from them).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Number of characters in a serial number.
    pub const LEN: usize = 6;

    /// Parses and validates a serial number.
    pub fn parse(raw: &str) -> Result<Self, EnvError> {
        if raw.chars().count() != Self::LEN {
            return Err(EnvError::serial(raw, format!("expected {} characters", Self::LEN)));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
        {
            return Err(EnvError::serial(raw, format!("unexpected character {:?}", bad)));
        }
        if raw.chars().filter(|c| c.is_ascii_digit()).count() < 2 {
            return Err(EnvError::serial(raw, "needs at least two digits"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the decimal digits of the serial number, in order.
    pub fn digits(&self) -> Vec<u8> {
        self.0
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect()
    }

    /// Returns the serial number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = EnvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl std::str::FromStr for SerialNumber {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one physical bomb (the shared context of its modules).
///
/// Name-based UUID derived from the serial number, so every module on the
/// same bomb computes the same id without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BombId(pub Uuid);

impl BombId {
    /// Derives the bomb identity from its serial number.
    pub fn from_serial(serial: &SerialNumber) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, serial.as_str().as_bytes()))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for BombId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Widgets on the bomb casing that the generator reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edgework {
    pub ports: u32,
    pub indicators: u32,
    pub batteries: u32,
    pub battery_holders: u32,
}

impl Edgework {
    /// Creates an edgework description.
    pub fn new(ports: u32, indicators: u32, batteries: u32, battery_holders: u32) -> Self {
        Self {
            ports,
            indicators,
            batteries,
            battery_holders,
        }
    }
}

impl std::str::FromStr for Edgework {
    type Err = EnvError;

    /// Parses `ports,indicators,batteries,holders`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let counts = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|e| EnvError::edgework(format!("{:?}: {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match counts.as_slice() {
            [ports, indicators, batteries, holders] => {
                if batteries < holders || *batteries > holders.saturating_mul(2) {
                    return Err(EnvError::edgework(format!(
                        "{} batteries cannot fill {} holders",
                        batteries, holders
                    )));
                }
                Ok(Self::new(*ports, *indicators, *batteries, *holders))
            }
            _ => Err(EnvError::edgework(format!(
                "expected 4 comma-separated counts, got {}",
                counts.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_digits() {
        let serial = SerialNumber::parse("AB3C5D").unwrap();
        assert_eq!(serial.digits(), vec![3, 5]);
        assert_eq!(serial.to_string(), "AB3C5D");
    }

    #[test]
    fn test_serial_rejects_malformed() {
        assert!(SerialNumber::parse("AB3C5").is_err());
        assert!(SerialNumber::parse("ab3c5d").is_err());
        assert!(SerialNumber::parse("ABCDE1").is_err());
        assert!(SerialNumber::parse("AB-C5D").is_err());
    }

    #[test]
    fn test_bomb_id_deterministic() {
        let a = SerialNumber::parse("AB3C5D").unwrap();
        let b = SerialNumber::parse("XY1Z9Q").unwrap();

        assert_eq!(BombId::from_serial(&a), BombId::from_serial(&a));
        assert_ne!(BombId::from_serial(&a), BombId::from_serial(&b));
    }

    #[test]
    fn test_edgework_parse() {
        let edgework: Edgework = "2,1,3,2".parse().unwrap();
        assert_eq!(edgework, Edgework::new(2, 1, 3, 2));

        assert!("1,2,3".parse::<Edgework>().is_err());
        assert!("0,0,5,1".parse::<Edgework>().is_err());
        assert!("0,0,x,0".parse::<Edgework>().is_err());

        let full = "0,0,4294967295,4294967295".parse::<Edgework>().unwrap();
        assert_eq!(full.battery_holders, u32::MAX);
    }
}
