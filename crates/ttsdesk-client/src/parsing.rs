//! Response body interpretation.

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// `{"error": "..."}` bodies sent by the server on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Human-readable error text from a non-200 body.
///
/// JSON bodies with an `error` field yield that field; any other non-empty
/// text is returned trimmed. Empty or non-UTF-8 bodies yield `None`.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(text) {
        Ok(parsed) if !parsed.error.trim().is_empty() => Some(parsed.error.trim().to_string()),
        _ => Some(text.to_string()),
    }
}

/// Decode a JSON array of strings.
pub fn parse_string_list(body: &[u8]) -> ClientResult<Vec<String>> {
    serde_json::from_slice(body).map_err(ClientError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_field_is_extracted() {
        assert_eq!(
            extract_error_message(br#"{"error": "Speaker not found"}"#),
            Some("Speaker not found".to_string())
        );
    }

    #[test]
    fn test_plain_text_is_kept() {
        assert_eq!(
            extract_error_message(b"  Internal Server Error\n"),
            Some("Internal Server Error".to_string())
        );
    }

    #[test]
    fn test_json_without_error_field_is_kept_verbatim() {
        assert_eq!(
            extract_error_message(br#"{"detail": "nope"}"#),
            Some(r#"{"detail": "nope"}"#.to_string())
        );
    }

    #[test]
    fn test_unreadable_bodies() {
        assert_eq!(extract_error_message(b""), None);
        assert_eq!(extract_error_message(b"   \n"), None);
        assert_eq!(extract_error_message(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn test_parse_string_list() {
        assert_eq!(
            parse_string_list(br#"["a", "b"]"#).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(matches!(
            parse_string_list(br#"{"models": []}"#),
            Err(ClientError::JsonParse(_))
        ));
    }
}
