//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};
use vres_core::known;

/// Generate a finite float that survives a JSON text round trip exactly.
pub fn finite_f64() -> impl Strategy<Value = f64> {
    (-1_000_000i32..=1_000_000i32).prop_map(|n| f64::from(n) / 8.0)
}

/// Generate a JSON scalar.
pub fn json_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        finite_f64().prop_map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number)),
        "[a-zA-Z0-9 _.-]{0,24}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON document up to a few levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_scalar().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((object_key(), inner), 0..8).prop_map(|pairs| {
                Value::Object(pairs.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

/// Generate an object key.
pub fn object_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}".prop_map(String::from)
}

/// Generate a media type that selects the JSON encoding.
pub fn json_media_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(known::JSON.to_string()),
        Just(known::GEO_JSON.to_string()),
        Just("application/json; charset=utf-8".to_string()),
        "[a-z]{1,8}".prop_map(|sub| format!("application/vnd.{}+json", sub)),
    ]
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vres_core::{canonical_cbor, canonical_json, encode, Encoding, MediaType};

    proptest! {
        #[test]
        fn test_json_roundtrip(value in json_value()) {
            let bytes = canonical_json(&value).unwrap();
            let back: Value = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn test_cbor_deterministic(value in json_value()) {
            let b1 = canonical_cbor(&value).unwrap();
            let b2 = canonical_cbor(&value).unwrap();
            prop_assert_eq!(b1, b2);
        }

        #[test]
        fn test_cbor_ignores_key_order(
            pairs in prop::collection::btree_map(object_key(), json_scalar(), 0..12),
        ) {
            let forward: Map<String, Value> = pairs.clone().into_iter().collect();
            let backward: Map<String, Value> = pairs.into_iter().rev().collect();

            let b1 = canonical_cbor(&Value::Object(forward)).unwrap();
            let b2 = canonical_cbor(&Value::Object(backward)).unwrap();
            prop_assert_eq!(b1, b2);
        }

        #[test]
        fn test_json_media_types_select_json(media in json_media_type(), value in json_value()) {
            let media = MediaType::parse(&media).unwrap();
            prop_assert_eq!(media.encoding(), Some(Encoding::Json));
            prop_assert_eq!(encode(&value, &media).unwrap(), canonical_json(&value).unwrap());
        }
    }
}
