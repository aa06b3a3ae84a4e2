use thiserror::Error;

/// Error type for project API operations.
///
/// - `RequestFailed`: network/transport errors (wraps `reqwest::Error`)
/// - `NotFound`: HTTP 404
/// - `Validation`: HTTP 400 / 422
/// - `Api`: any other non-2xx status code
/// - `Decode`: a 2xx body that does not match the expected shape
/// - `Io`: the local file picked for upload could not be read
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Cannot open viewer: {0}")]
    Open(String),
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            404 => ApiError::NotFound { message },
            400 | 422 => ApiError::Validation { message },
            _ => ApiError::Api { status, message },
        }
    }
}

/// Pull a human readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "detail", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }

    Some(trimmed.to_string())
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_uses_json_message() {
        let err = ApiError::from_status(404, r#"{"message":"project 9 missing"}"#);
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "project 9 missing"));
    }

    #[test]
    fn test_validation_reads_detail_field() {
        let err = ApiError::from_status(422, r#"{"detail":"name required"}"#);
        assert_eq!(err.to_string(), "Validation error: name required");
    }

    #[test]
    fn test_empty_body_falls_back_to_status() {
        let err = ApiError::from_status(503, "");
        assert!(matches!(err, ApiError::Api { status: 503, ref message } if message == "HTTP 503"));
    }

    #[test]
    fn test_plain_text_body_kept_verbatim() {
        let err = ApiError::from_status(500, "  boom  ");
        assert_eq!(err.to_string(), "API error 500: boom");
    }
}
