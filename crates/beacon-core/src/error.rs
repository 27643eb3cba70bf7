//! Payload decoding error types.

/// Errors raised while decoding a transport-encoded payload field.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Field is not valid URL-safe base64.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8 text.
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Decoded text is not valid JSON.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON is well formed but not the expected self-describing shape.
    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    /// The log entry has no such field.
    #[error("Missing field: {0}")]
    MissingField(String),
}

/// Result type for payload decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn base64_error_from() {
        let err = STANDARD.decode("!!!").unwrap_err();
        let e: DecodeError = err.into();
        assert!(matches!(e, DecodeError::Base64(_)));
        assert!(e.to_string().starts_with("Invalid base64 payload: "));
    }

    #[test]
    fn utf8_error_from() {
        let err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let e: DecodeError = err.into();
        assert!(matches!(e, DecodeError::Utf8(_)));
    }

    #[test]
    fn json_error_from() {
        let json_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
        let e: DecodeError = json_err.unwrap_err().into();
        assert!(matches!(e, DecodeError::Json(_)));
    }

    #[test]
    fn shape_display() {
        let e = DecodeError::Shape("missing schema".into());
        assert_eq!(e.to_string(), "Unexpected payload shape: missing schema");
    }

    #[test]
    fn missing_field_display() {
        let e = DecodeError::MissingField("cx".into());
        assert_eq!(e.to_string(), "Missing field: cx");
    }
}
