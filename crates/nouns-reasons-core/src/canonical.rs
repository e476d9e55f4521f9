// SPDX-License-Identifier: Apache-2.0

//! Key-order independent JSON encoding and the content tags derived from it.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hex prefix length kept in an entity tag.
pub const ETAG_HEX_LEN: usize = 16;

pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sort_keys(serde_json::to_value(value)?))
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Weak entity tag over the canonical encoding of `value`.
pub fn json_etag<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let digest = sha256_hex(&canonical_json_bytes(value)?);
    Ok(format!("W/\"{}\"", &digest[..ETAG_HEX_LEN]))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_are_sorted() {
        let bytes = canonical_json_bytes(&json!({
            "votes": [{"support": "FOR", "id": "1"}],
            "address": "0x0",
        }))
        .expect("canonical bytes");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            r#"{"address":"0x0","votes":[{"id":"1","support":"FOR"}]}"#
        );
    }

    #[test]
    fn etag_is_weak_and_ignores_key_order() {
        let a = json_etag(&json!({"a": 1, "b": [1, 2]})).expect("etag a");
        let b = json_etag(&json!({"b": [1, 2], "a": 1})).expect("etag b");
        assert_eq!(a, b);
        assert!(a.starts_with("W/\"") && a.ends_with('"'));
        assert_eq!(a.len(), ETAG_HEX_LEN + 4);
    }

    #[test]
    fn etag_changes_with_content() {
        let a = json_etag(&json!([{"id": "1"}])).expect("etag a");
        let b = json_etag(&json!([{"id": "2"}])).expect("etag b");
        assert_ne!(a, b);
    }
}
