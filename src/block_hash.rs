use crate::hex::{Hex, HexError};

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// An opaque reference to a historical block.
///
/// It is displayed and parsed as `0x`-prefixed hexadecimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        BlockHash(bytes)
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b: &[u8] = &self.0;
        write!(f, "0x{}", Hex::from(b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockHashError {
    MissingPrefix,
    Hex(HexError),
    Length(usize),
}

impl Display for BlockHashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockHashError::MissingPrefix => write!(f, "block hash must start with 0x"),
            BlockHashError::Hex(err) => write!(f, "{}", err),
            BlockHashError::Length(n) => write!(f, "block hash has {} bytes, expected 32", n),
        }
    }
}

impl FromStr for BlockHash {
    type Err = BlockHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or(BlockHashError::MissingPrefix)?;
        let bytes = Hex::decode(digits).map_err(BlockHashError::Hex)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| BlockHashError::Length(v.len()))?;
        Ok(BlockHash(bytes))
    }
}

impl Serialize for BlockHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[test]
fn test_block_hash_parse_display() {
    let text = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";
    let hash: BlockHash = text.parse().unwrap();
    assert_eq!(hash.to_string(), text);
    assert_eq!(hash.as_bytes()[0], 0x91);
}

#[test]
fn test_block_hash_rejects_bad_input() {
    assert_eq!(
        "91b1".parse::<BlockHash>(),
        Err(BlockHashError::MissingPrefix)
    );
    assert_eq!("0x91b1".parse::<BlockHash>(), Err(BlockHashError::Length(2)));
    assert!(matches!(
        "0xzz".parse::<BlockHash>(),
        Err(BlockHashError::Hex(_))
    ));
}

#[test]
fn test_block_hash_json() {
    let hash = BlockHash::from([7u8; 32]);
    let json = serde_json::to_string(&hash).unwrap();
    assert_eq!(json, format!("\"{}\"", hash));
    let hash_: BlockHash = serde_json::from_str(&json).unwrap();
    assert_eq!(hash, hash_);
}
