use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// This function reads a file from `file_path`, attempts to parse it
/// as JSON, and returns an instance of `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read_to_string(file_path.as_ref()).map_err(Error::IoError)?;

    parse_json_str(&data)
}

/// Parses a JSON string into a given type `T`.
pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    let parsed_data: T = serde_json::from_str(data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

/// Encodes `value` as two-space indented JSON terminated by a newline.
///
/// The encoding is stable for a given value: every map in the workflow model is
/// key-ordered, so repeated calls produce identical bytes.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut encoded = serde_json::to_string_pretty(value)?;
    encoded.push('\n');
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_parse_json_str_reports_malformed_input() {
        let result = parse_json_str::<Value>("{ not json");
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }

    #[test]
    fn test_parse_json_file_missing() {
        let result = parse_json_file::<Value>("definitely/not/here.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_pretty_json_is_stable() {
        let value = json!({ "b": 1, "a": [1, 2] });
        let first = to_pretty_json(&value).unwrap();
        let second = to_pretty_json(&value).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("}\n"));
        assert!(first.contains("\n  \"a\""));
    }
}
