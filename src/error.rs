use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Main error type for TMDB API operations
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Transport failure (DNS, connect, timeout, TLS) during authentication or a request
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The token endpoint answered without `access_token`/`expires_in`
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response body is not valid JSON
    #[error("bad JSON in response: {0}")]
    BadResponseFormat(#[from] serde_json::Error),

    /// Decoded response carried a status outside 200..=299
    #[error("{status} - {reason}")]
    Api {
        status: u16,
        reason: String,
        /// Decoded error payload, `Value::Null` when the body was not read
        data: Value,
    },

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error while writing a download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TmdbError {
    /// Create a new API error from a status, the server's reason phrase and the decoded body
    pub fn api(status: StatusCode, reason: impl Into<String>, data: Value) -> Self {
        TmdbError::Api {
            status: status.as_u16(),
            reason: reason.into(),
            data,
        }
    }

    /// Get the HTTP status code if this is an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TmdbError::Api { status, .. } => Some(*status),
            TmdbError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// TMDB's own `status_message` from an API error payload, if any
    pub fn api_message(&self) -> Option<&str> {
        match self {
            TmdbError::Api { data, .. } => data.get("status_message").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Check if this error is an unauthorized error (401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TmdbError::Api { status: 401, .. })
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, TmdbError::Api { status: 404, .. })
    }

    /// Check if this error came from the transport rather than the API
    pub fn is_transport(&self) -> bool {
        matches!(self, TmdbError::RequestFailed(_))
    }
}

/// Result type for TMDB operations
pub type Result<T> = std::result::Result<T, TmdbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_message() {
        let error = TmdbError::api(StatusCode::NOT_FOUND, "Not Found", json!({}));
        assert_eq!(error.to_string(), "404 - Not Found");
        assert!(error.is_not_found());
        assert!(!error.is_unauthorized());
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn test_api_error_non_canonical_reason() {
        let status = StatusCode::from_u16(520).unwrap();
        let error = TmdbError::api(status, "Web Server Returned an Unknown Error", Value::Null);
        assert_eq!(error.to_string(), "520 - Web Server Returned an Unknown Error");
    }

    #[test]
    fn test_api_error_payload_message() {
        let error = TmdbError::api(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            json!({"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key."}),
        );
        assert!(error.is_unauthorized());
        assert_eq!(
            error.api_message(),
            Some("Invalid API key: You must be granted a valid key.")
        );
    }

    #[test]
    fn test_authentication_failed_has_no_status() {
        let error = TmdbError::AuthenticationFailed("invalid key".to_string());
        assert_eq!(error.status_code(), None);
        assert!(error.to_string().contains("invalid key"));
        assert!(!error.is_transport());
    }

    #[test]
    fn test_bad_response_format_from_json_error() {
        let decode = serde_json::from_str::<Value>("<html>").unwrap_err();
        let error: TmdbError = decode.into();
        assert!(matches!(error, TmdbError::BadResponseFormat(_)));
        assert!(error.to_string().starts_with("bad JSON in response"));
    }
}
