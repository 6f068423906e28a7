use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};
use std::io;

use crate::error::Result;

/// Hex digest of the all-zero sentinel used as the genesis `previous_hash`.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// JSON formatter matching the ledger's on-disk hashing convention:
/// `", "` between items, `": "` after keys and every non-ASCII (or DEL)
/// character escaped as `\uXXXX`.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Rebuild every object with its keys in lexicographic order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Canonical byte serialization of `record`: a pure function of its logical
/// content, independent of field or insertion order.
pub fn canonical_json<T: Serialize + ?Sized>(record: &T) -> Result<Vec<u8>> {
    let value = canonicalize(serde_json::to_value(record)?);
    let mut out = Vec::with_capacity(256);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// SHA-256 of the canonical serialization, as lowercase hex.
pub fn digest<T: Serialize + ?Sized>(record: &T) -> Result<String> {
    let bytes = canonical_json(record)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_zeros(hex_digest: &str) -> usize {
    hex_digest.chars().take_while(|c| *c == '0').count()
}

pub fn meets_difficulty(hex_digest: &str, difficulty: u32) -> bool {
    leading_zeros(hex_digest) >= difficulty as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Unordered {
        zeta: u32,
        alpha: &'static str,
    }

    #[test]
    fn serialization_sorts_keys_and_escapes_non_ascii() {
        let value = json!({"b": [1, "é😀\u{7f}"], "a": null});
        let bytes = canonical_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a": null, "b": [1, "\u00e9\ud83d\ude00\u007f"]}"#
        );
    }

    #[test]
    fn digest_ignores_field_order() {
        let from_struct = digest(&Unordered {
            zeta: 7,
            alpha: "x",
        })
        .unwrap();
        let from_map = digest(&json!({"alpha": "x", "zeta": 7})).unwrap();
        assert_eq!(from_struct, from_map);
    }

    #[test]
    fn digest_matches_known_vector() {
        let d = digest(&json!({"a": 1})).unwrap();
        assert_eq!(
            d,
            "f9d86028c6e0d64e225186f96acb69338b2c59764df79162107f5c4bb34d1310"
        );
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn leading_zero_count() {
        assert_eq!(leading_zeros("00a0"), 2);
        assert_eq!(leading_zeros("a000"), 0);
        assert_eq!(leading_zeros(ZERO_HASH), 64);
        assert!(meets_difficulty("000f", 3));
        assert!(!meets_difficulty("000f", 4));
        assert!(meets_difficulty("f", 0));
    }
}
