//! # Hex-tagged text encoding
//!
//! Every byte string and integer on the JSON surface is written as a
//! `0x`-prefixed lowercase hex string. Byte strings keep their full width;
//! integers use the minimal "quantity" form (`0x0`, `0x1a`).
//!
//! The submodules are meant for `#[serde(with = "...")]`.

use crate::errors::TypesError;

/// Encodes bytes as `0x`-prefixed lowercase hex.
pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes `0x`-prefixed hex into bytes. The prefix is mandatory.
pub fn decode_prefixed(text: &str) -> Result<Vec<u8>, TypesError> {
    let stripped = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or(TypesError::MissingPrefix)?;
    hex::decode(stripped).map_err(|e| TypesError::InvalidHex(e.to_string()))
}

/// Decodes `0x`-prefixed hex into a fixed-width array.
pub fn decode_fixed<const N: usize>(text: &str, kind: &'static str) -> Result<[u8; N], TypesError> {
    let raw = decode_prefixed(text)?;
    if raw.len() != N {
        return Err(TypesError::InvalidLength {
            kind,
            expected: N,
            got: raw.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&raw);
    Ok(out)
}

/// `Vec<u8>` as `0x`-prefixed hex.
pub mod bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_prefixed(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_prefixed(&text).map_err(D::Error::custom)
    }
}

/// `u64` as a hex quantity (`0x0`, `0x5208`).
pub mod quantity {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text
            .strip_prefix("0x")
            .ok_or_else(|| D::Error::custom("hex quantity without 0x prefix"))?;
        if digits.is_empty() {
            return Err(D::Error::custom("empty hex quantity"));
        }
        u64::from_str_radix(digits, 16).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_mandatory() {
        assert_eq!(decode_prefixed("abcd"), Err(TypesError::MissingPrefix));
        assert_eq!(decode_prefixed("0xabcd").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_fixed_width_is_checked() {
        let err = decode_fixed::<4>("0x0102", "nonce").unwrap_err();
        assert_eq!(
            err,
            TypesError::InvalidLength {
                kind: "nonce",
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn test_quantity_form() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap(#[serde(with = "quantity")] u64);

        assert_eq!(serde_json::to_string(&Wrap(0)).unwrap(), "\"0x0\"");
        assert_eq!(serde_json::to_string(&Wrap(21000)).unwrap(), "\"0x5208\"");
        let back: Wrap = serde_json::from_str("\"0x5208\"").unwrap();
        assert_eq!(back.0, 21000);
        assert!(serde_json::from_str::<Wrap>("\"5208\"").is_err());
    }
}
