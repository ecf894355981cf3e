//! JSON encoding of request parameters and decoding of response bodies.

use serde::Serialize;
use serde_json::Value;

/// Encode POST parameters as a JSON document.
pub fn encode<P: Serialize + ?Sized>(params: &P) -> Result<String, serde_json::Error> {
    serde_json::to_string(params)
}

/// Decode a response body. An empty (or whitespace-only) body is `Null`.
pub fn decode(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}
