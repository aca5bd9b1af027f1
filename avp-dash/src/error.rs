//! Error types for the dashboard client
//!
//! Every variant maps to a user-visible message; none of them is fatal to
//! the process.

use thiserror::Error;

/// Client-side file validation failures
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// MIME type outside the accepted image types
    #[error("Please upload a valid image file (JPG, PNG, WebP)")]
    UnsupportedType(String),

    /// File exceeds the upload size limit (size in bytes)
    #[error("File too large. Maximum size is 10MB.")]
    TooLarge(u64),
}

/// Failure reading or encoding a file for upload
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Backend HTTP client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, reset, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Backend answered 404 for a specific resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not decode
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Message suitable for `Upload failed: <message>`
    ///
    /// API errors surface the server-supplied text alone.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(_, message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// A failed fetch during a refresh cycle
#[derive(Debug, Error)]
#[error("Failed to fetch {resource}: {source}")]
pub struct FetchError {
    pub resource: avp_common::events::FetchResource,
    #[source]
    pub source: ClientError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::UnsupportedType("image/gif".into()).to_string(),
            "Please upload a valid image file (JPG, PNG, WebP)"
        );
        assert_eq!(
            ValidationError::TooLarge(11 * 1024 * 1024).to_string(),
            "File too large. Maximum size is 10MB."
        );
    }

    #[test]
    fn test_api_user_message_is_server_text() {
        let err = ClientError::Api(400, "Missing image data".into());
        assert_eq!(err.user_message(), "Missing image data");
        assert_eq!(err.to_string(), "API error 400: Missing image data");
    }
}
