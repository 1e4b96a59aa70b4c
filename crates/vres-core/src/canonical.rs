//! Canonical encodings for structured payloads.
//!
//! The media type picks the encoding (see [`MediaType::encoding`]):
//!
//! - **JSON**: compact, no whitespace, object keys in insertion order.
//! - **CBOR**: RFC 8949 core deterministic encoding. Map keys are sorted by
//!   their encoded bytes, integers use the smallest valid width, lengths are
//!   definite. Floats use the shortest of binary16/binary32/binary64 that
//!   preserves the value, NaN is `f97e00`. Tags are rejected.
//! - **Text**: the value must serialize to a string; its UTF-8 bytes are used.
//!
//! Encoding is a pure function of the value: the same value always produces
//! the same bytes, so a resolved payload can be compared byte-for-byte with a
//! fresh encoding.

use ciborium::value::Value;
use serde::Serialize;

use crate::error::{EncodingError, Result};
use crate::media::{Encoding, MediaType};

/// Encode `value` using the encoding implied by `media_type`.
pub fn encode<T: Serialize + ?Sized>(value: &T, media_type: &MediaType) -> Result<Vec<u8>> {
    match media_type.encoding() {
        Some(Encoding::Json) => canonical_json(value),
        Some(Encoding::Cbor) => canonical_cbor(value),
        Some(Encoding::Text) => text_bytes(value, media_type),
        None => Err(EncodingError::UnsupportedMediaType(
            media_type.essence().to_string(),
        )),
    }
}

/// Encode a value as compact JSON.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Encode a value as deterministic CBOR.
pub fn canonical_cbor<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value = Value::serialized(value).map_err(|e| EncodingError::Cbor(e.to_string()))?;
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value)?;
    Ok(buf)
}

/// Encode a string-valued value as its UTF-8 bytes.
fn text_bytes<T: Serialize + ?Sized>(value: &T, media_type: &MediaType) -> Result<Vec<u8>> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s.into_bytes()),
        _ => Err(EncodingError::NotText(media_type.essence().to_string())),
    }
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(f) => encode_float(buf, *f),
        Value::Tag(tag, _) => {
            return Err(EncodingError::Cbor(format!("tag {} not supported", tag)));
        }
        _ => return Err(EncodingError::Cbor("unsupported CBOR value type".into())),
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a float in the shortest lossless width.
fn encode_float(buf: &mut Vec<u8>, f: f64) {
    if f.is_nan() {
        // Canonical half-precision quiet NaN.
        buf.extend_from_slice(&[0xf9, 0x7e, 0x00]);
        return;
    }

    let narrow = f as f32;
    if f64::from(narrow) == f {
        if let Some(half) = f32_to_f16_exact(narrow) {
            buf.push(0xf9);
            buf.extend_from_slice(&half.to_be_bytes());
        } else {
            buf.push(0xfa);
            buf.extend_from_slice(&narrow.to_be_bytes());
        }
    } else {
        buf.push(0xfb);
        buf.extend_from_slice(&f.to_be_bytes());
    }
}

/// The binary16 bits for `f`, if it converts without losing anything.
fn f32_to_f16_exact(f: f32) -> Option<u16> {
    let bits = f.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp_field = (bits >> 23) & 0xff;
    let mant = bits & 0x7f_ffff;

    if exp_field == 0xff {
        // Infinity; NaN is handled by the caller.
        return Some(sign | 0x7c00);
    }
    if exp_field == 0 {
        // Zero survives; f32 subnormals are far below the binary16 range.
        return (mant == 0).then_some(sign);
    }

    let exp = exp_field as i32 - 127;
    match exp {
        -14..=15 => {
            // Normal binary16: the low 13 mantissa bits must be zero.
            ((mant & 0x1fff) == 0)
                .then(|| sign | (((exp + 15) as u16) << 10) | (mant >> 13) as u16)
        }
        -24..=-15 => {
            // Subnormal binary16: value = m * 2^-24 with m < 1024.
            let full = mant | 0x80_0000;
            let shift = (-(exp + 1)) as u32;
            ((full & ((1u32 << shift) - 1)) == 0).then(|| sign | (full >> shift) as u16)
        }
        _ => None,
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<()> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut key_value_pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::known;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn media(s: &str) -> MediaType {
        MediaType::parse(s).unwrap()
    }

    #[test]
    fn test_json_keeps_insertion_order() {
        let value = json!({"type": "FeatureCollection", "features": []});
        let bytes = encode(&value, &media(known::JSON)).unwrap();
        assert_eq!(bytes, br#"{"type":"FeatureCollection","features":[]}"#);
    }

    #[test]
    fn test_geo_json_uses_json_encoding() {
        let value = json!({"type": "Point", "coordinates": [-104.5, 39.75]});
        let bytes = encode(&value, &media(known::GEO_JSON)).unwrap();
        assert_eq!(bytes, br#"{"type":"Point","coordinates":[-104.5,39.75]}"#);
    }

    #[test]
    fn test_json_rejects_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert((1u8, 2u8), "tuple key");
        let err = encode(&map, &media(known::JSON)).unwrap_err();
        assert!(matches!(err, EncodingError::Json(_)));
    }

    #[test]
    fn test_text_requires_string() {
        let kml = "<kml xmlns=\"http://www.opengis.net/kml/2.2\"/>";
        let bytes = encode(kml, &media(known::KML)).unwrap();
        assert_eq!(bytes, kml.as_bytes());

        let err = encode(&json!({"not": "text"}), &media(known::TEXT)).unwrap_err();
        assert!(matches!(err, EncodingError::NotText(m) if m == "text/plain"));
    }

    #[test]
    fn test_unsupported_media_type() {
        let err = encode(&json!(1), &media("image/png")).unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedMediaType(m) if m == "image/png"));
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 65536);
        assert_eq!(buf, vec![0x1a, 0x00, 0x01, 0x00, 0x00]);

        buf.clear();
        encode_integer(&mut buf, (-1i64).into());
        assert_eq!(buf, vec![0x20]);

        buf.clear();
        encode_integer(&mut buf, (-100i64).into());
        assert_eq!(buf, vec![0x38, 99]);
    }

    #[test]
    fn test_cbor_map_keys_sorted() {
        // Keys sort by encoded bytes: shorter text first, then bytewise.
        let value = json!({"type": 1, "a": 2, "id": 3});
        let bytes = canonical_cbor(&value).unwrap();
        assert_eq!(
            bytes,
            vec![
                0xa3, // map(3)
                0x61, b'a', 0x02, // "a": 2
                0x62, b'i', b'd', 0x03, // "id": 3
                0x64, b't', b'y', b'p', b'e', 0x01, // "type": 1
            ]
        );
    }

    #[test]
    fn test_cbor_is_order_independent() {
        let a = canonical_cbor(&json!({"x": 1, "y": [true, null]})).unwrap();
        let b = canonical_cbor(&json!({"y": [true, null], "x": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cbor_floats() {
        let bytes = canonical_cbor(&1.5f64).unwrap();
        assert_eq!(bytes, vec![0xf9, 0x3e, 0x00]);

        // Exact in binary32 but not in binary16.
        let bytes = canonical_cbor(&100000.0f64).unwrap();
        assert_eq!(bytes, vec![0xfa, 0x47, 0xc3, 0x50, 0x00]);

        let bytes = canonical_cbor(&0.1f64).unwrap();
        assert_eq!(bytes[0], 0xfb);
        assert_eq!(bytes.len(), 9);

        let bytes = canonical_cbor(&f64::NAN).unwrap();
        assert_eq!(bytes, vec![0xf9, 0x7e, 0x00]);
    }

    #[test]
    fn test_cbor_half_precision_edges() {
        let cases: [(f64, &[u8]); 8] = [
            (0.0, &[0xf9, 0x00, 0x00]),
            (-0.0, &[0xf9, 0x80, 0x00]),
            (f64::INFINITY, &[0xf9, 0x7c, 0x00]),
            (f64::NEG_INFINITY, &[0xf9, 0xfc, 0x00]),
            (65504.0, &[0xf9, 0x7b, 0xff]),
            (5.960464477539063e-8, &[0xf9, 0x00, 0x01]),
            (0.00006103515625, &[0xf9, 0x04, 0x00]),
            (-4.0, &[0xf9, 0xc4, 0x00]),
        ];
        for (value, expected) in cases {
            assert_eq!(canonical_cbor(&value).unwrap(), expected, "{}", value);
        }

        // One past binary16 range, and a value needing 11 significant bits.
        assert_eq!(canonical_cbor(&65536.0f64).unwrap()[0], 0xfa);
        assert_eq!(canonical_cbor(&2049.0f64).unwrap()[0], 0xfa);
    }

    #[test]
    fn test_cbor_rejects_tags() {
        let mut buf = Vec::new();
        let tagged = Value::Tag(1, Box::new(Value::Integer(0.into())));
        assert!(matches!(
            encode_value_to(&mut buf, &tagged),
            Err(EncodingError::Cbor(_))
        ));
    }
}
