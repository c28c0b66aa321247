use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{AppError, Result};

pub const ADDRESS_LEN: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            AppError::InvalidLength(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Address {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.strip_prefix("0x").unwrap_or(value);
        let bytes = hex::decode(value)
            .map_err(|_| AppError::InvalidParams(format!("Invalid address '{value}'")))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_or_without_prefix() {
        let address: Address = "0x0102030405060708090a0b0c0d0e0f1011121314".parse().unwrap();
        assert_eq!(address.as_bytes()[0], 1);
        assert_eq!(address.to_string(), "0102030405060708090a0b0c0d0e0f1011121314");

        let same: Address = "0102030405060708090a0b0c0d0e0f1011121314".parse().unwrap();
        assert_eq!(address, same);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            "0102".parse::<Address>(),
            Err(AppError::InvalidLength(_))
        ));
        assert!(matches!(
            "zz".parse::<Address>(),
            Err(AppError::InvalidParams(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let address = Address::new([0xAB; ADDRESS_LEN]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(ADDRESS_LEN)));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
