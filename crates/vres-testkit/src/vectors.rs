//! Golden test vectors for the payload encodings.
//!
//! Each vector pins the exact bytes a value must encode to under a media
//! type. Consumers that cache or compare resolved payloads rely on these
//! bytes never drifting.

use serde_json::Value;
use vres_core::{encode, MediaType};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Media type to publish under.
    pub media_type: &'static str,
    /// The value, as JSON text. Key order is significant.
    pub input_json: &'static str,
    /// Expected encoded payload (hex).
    pub expected_hex: &'static str,
}

impl GoldenVector {
    /// Parse the input into a value.
    ///
    /// # Panics
    ///
    /// Panics if `input_json` is not valid JSON.
    pub fn input(&self) -> Value {
        serde_json::from_str(self.input_json).expect("golden vector input must be valid JSON")
    }

    /// Encode the input under the vector's media type.
    pub fn encode(&self) -> Result<Vec<u8>, vres_core::EncodingError> {
        let media_type = MediaType::parse(self.media_type)?;
        encode(&self.input(), &media_type)
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty feature collection as json",
            media_type: "application/json",
            input_json: r#"{"type":"FeatureCollection","features":[]}"#,
            expected_hex: "7b2274797065223a2246656174757265436f6c6c656374696f6e222c226665617475726573223a5b5d7d",
        },
        GoldenVector {
            name: "point as geo+json",
            media_type: "application/geo+json",
            input_json: r#"{"type":"Point","coordinates":[-104.991531,39.742043]}"#,
            expected_hex: "7b2274797065223a22506f696e74222c22636f6f7264696e61746573223a5b2d3130342e3939313533312c33392e3734323034335d7d",
        },
        GoldenVector {
            name: "json keeps insertion order",
            media_type: "application/json",
            input_json: r#"{"b":[1,2],"a":{"z":null,"y":false}}"#,
            expected_hex: "7b2262223a5b312c325d2c2261223a7b227a223a6e756c6c2c2279223a66616c73657d7d",
        },
        GoldenVector {
            name: "plain text string",
            media_type: "text/plain",
            input_json: r#""hello""#,
            expected_hex: "68656c6c6f",
        },
        GoldenVector {
            name: "point as cbor",
            media_type: "application/cbor",
            input_json: r#"{"type":"Point","coordinates":[-104.991531,39.742043]}"#,
            expected_hex: "a2647479706565506f696e746b636f6f7264696e6174657382fbc05a3f753e707e17fb4043defb43d89ce5",
        },
        GoldenVector {
            name: "cbor sorts map keys",
            media_type: "application/cbor",
            input_json: r#"{"type":1,"a":2,"id":3}"#,
            expected_hex: "a361610262696403647479706501",
        },
        GoldenVector {
            name: "cbor shortest floats and simple values",
            media_type: "application/cbor",
            input_json: "[1.5,-1,null,true]",
            expected_hex: "84f93e0020f6f5",
        },
    ]
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, actual_hex)` for each vector. Encoding failures
/// report as a mismatch with the error text in place of the hex.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match v.encode() {
            Ok(bytes) => {
                let hex = hex::encode(bytes);
                (v.name.to_string(), hex == v.expected_hex, hex)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}
