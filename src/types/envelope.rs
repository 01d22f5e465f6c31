//! Response Envelopes
//!
//! Many API responses wrap their real payload under a single top-level key
//! (`{"tracks": {...}}`). Extraction failures capture the offending payload
//! for diagnostics, bounded so a pathological server response cannot pin
//! arbitrary amounts of memory in an error value.

use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum number of bytes of a payload captured into
/// [`Error::TopLevelKeyNotFound`].
pub const ENVELOPE_CAPTURE_MAX: usize = 2048;

/// Extract the value under `key` from a response envelope.
pub fn top_level_key<'a>(payload: &'a Value, key: &str) -> Result<&'a Value> {
    payload.get(key).ok_or_else(|| Error::TopLevelKeyNotFound {
        key: key.to_string(),
        payload: capture(payload),
    })
}

fn capture(payload: &Value) -> String {
    let mut rendered = payload.to_string();
    if rendered.len() > ENVELOPE_CAPTURE_MAX {
        // Truncate on a char boundary
        let mut end = ENVELOPE_CAPTURE_MAX;
        while !rendered.is_char_boundary(end) {
            end -= 1;
        }
        rendered.truncate(end);
        rendered.push_str("…(truncated)");
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_present_key() {
        let payload = json!({"tracks": {"items": []}});
        let tracks = top_level_key(&payload, "tracks").unwrap();
        assert_eq!(tracks, &json!({"items": []}));
    }

    #[test]
    fn test_missing_key_captures_payload() {
        let payload = json!({"albums": {}});
        let err = top_level_key(&payload, "tracks").unwrap_err();
        match err {
            Error::TopLevelKeyNotFound { key, payload } => {
                assert_eq!(key, "tracks");
                assert!(payload.contains("albums"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_capture_is_bounded() {
        let huge = "x".repeat(64 * 1024);
        let payload = json!({ "data": huge });
        let err = top_level_key(&payload, "tracks").unwrap_err();
        match err {
            Error::TopLevelKeyNotFound { payload, .. } => {
                assert!(payload.len() <= ENVELOPE_CAPTURE_MAX + "…(truncated)".len());
                assert!(payload.ends_with("…(truncated)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
