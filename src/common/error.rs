// Error handling types for the client

use serde::Deserialize;
use tracing::error;

use super::validation::ValidationResult;

pub type ClientResult<T> = Result<T, ClientError>;

/// Client error types
///
/// Every variant can be turned into the single string the UI shows inline,
/// in a banner, or in a toast via [`ClientError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// Error body shapes returned by the API
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ClientError {
    /// Builds an HTTP error from a failed response body, preferring the
    /// structured `error` / `message` field over a generic fallback
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|parsed| parsed.error.or(parsed.message))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback_message(status));

        ClientError::Http { status, message }
    }

    /// The human-readable string surfaced to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Decode(_) => "Unexpected response from the server".to_string(),
            ClientError::Storage(_) | ClientError::Io(_) => {
                error!(error = %self, "Local storage failure");
                "Could not access local storage".to_string()
            }
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotConfigured(msg) => msg.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Http { status: 401, .. })
    }
}

fn fallback_message(status: u16) -> String {
    format!("Request failed (HTTP {})", status)
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// Helper function to convert ValidationResult to ClientError
impl From<ValidationResult> for ClientError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ClientError::Validation(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ClientError::Validation(error_messages.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_error_field() {
        let err = ClientError::from_status(409, r#"{"error": "Email already registered"}"#);
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn test_from_status_uses_message_field() {
        let err = ClientError::from_status(400, r#"{"message": "Bad pseudonym"}"#);
        assert_eq!(err.user_message(), "Bad pseudonym");
    }

    #[test]
    fn test_from_status_falls_back_on_unstructured_body() {
        let err = ClientError::from_status(502, "<html>bad gateway</html>");
        assert_eq!(err.user_message(), "Request failed (HTTP 502)");

        let err = ClientError::from_status(500, r#"{"error": "  "}"#);
        assert_eq!(err.user_message(), "Request failed (HTTP 500)");
    }

    #[test]
    fn test_validation_result_conversion() {
        let mut result = ValidationResult::new();
        result.add_error("email", "Email is required");
        let err: ClientError = result.into();
        assert_eq!(err.user_message(), "email: Email is required");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::from_status(401, "").is_unauthorized());
        assert!(!ClientError::from_status(403, "").is_unauthorized());
    }
}
