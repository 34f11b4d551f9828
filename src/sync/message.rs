// Wire format: flat string-keyed, string-valued mappings

use crate::error::Error;
use std::collections::HashMap;

/// A settings message: flat mapping from string key to string value.
///
/// The empty mapping is the reserved probe sentinel requesting an
/// immediate echo of current state.
pub type Settings = HashMap<String, String>;

/// Decode one text payload into a settings mapping.
///
/// Structural decoding only: anything that is not a flat object with
/// string values (arrays, numbers, nested objects) is a decode error.
pub fn decode(raw: &str) -> Result<Settings, Error> {
    Ok(serde_json::from_str(raw)?)
}

/// Serialize a settings mapping to one text payload.
pub fn encode(settings: &Settings) -> String {
    // A string-keyed map of strings always serializes
    serde_json::to_string(settings).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut settings = Settings::new();
        settings.insert("gain".to_string(), "5".to_string());
        settings.insert("mode".to_string(), "auto".to_string());

        let decoded = decode(&encode(&settings)).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_round_trip_empty_mapping() {
        let settings = Settings::new();
        assert_eq!(encode(&settings), "{}");
        assert!(decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_nested_value_is_decode_error() {
        assert!(matches!(
            decode(r#"{"gain": {"nested": "1"}}"#),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_non_string_value_is_decode_error() {
        assert!(decode(r#"{"gain": 5}"#).is_err());
    }

    #[test]
    fn test_non_object_payload_is_decode_error() {
        assert!(decode("[1, 2, 3]").is_err());
        assert!(decode("not json").is_err());
    }
}
