//! Error types and the provider error contract

use std::collections::HashMap;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for transport-level HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// Code reported when a failed call carried no decodable error payload
pub const UNKNOWN_ERROR_CODE: &str = "Unknown";

/// Transport and construction errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network request failed
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

/// Contract for a provider's error payload.
///
/// Implement this on the type a provider returns for failed calls. Only
/// [`code`](ProviderErrorModel::code) is required; the remaining accessors
/// default to empty values for providers that do not report them.
pub trait ProviderErrorModel {
    /// Machine-readable identifier for the kind of error
    fn code(&self) -> String;

    /// Short human-readable title
    fn title(&self) -> String {
        String::new()
    }

    /// Detailed human-readable message
    fn message(&self) -> String {
        String::new()
    }

    /// Per-field validation messages, keyed by field name
    fn field_errors(&self) -> HashMap<String, Vec<String>> {
        HashMap::new()
    }
}

/// Structured failure raised for any classified provider error.
///
/// Built exactly once per failed call and never mutated. `error_model` holds
/// the decoded payload when one was present, so callers can branch on
/// provider-specific detail without re-parsing:
///
/// ```ignore
/// match client.send_json::<Account, UpstreamError>(request).await {
///     Ok(account) => handle(account),
///     Err(SendError::Provider(e)) if e.code == "Upstream_1234" => recover(e),
///     Err(other) => return Err(other.into()),
/// }
/// ```
#[derive(Debug, Error)]
#[error("provider call failed with code '{code}' (http {status})")]
pub struct ProviderError<E: std::fmt::Debug> {
    /// Identifier for the provider's error type, `"Unknown"` when the payload
    /// was absent
    pub code: String,
    /// Title of the error as reported by the provider
    pub title: String,
    /// Detail message as reported by the provider
    pub detail: String,
    /// HTTP status code returned by the provider
    pub status: StatusCode,
    /// Per-field validation errors, usually populated on 400 responses
    pub field_errors: HashMap<String, Vec<String>>,
    /// The decoded error payload, when one was present
    pub error_model: Option<E>,
}

impl<E: ProviderErrorModel + std::fmt::Debug> ProviderError<E> {
    /// Build a failure from a decoded payload (or its absence) and the
    /// response status.
    pub fn from_model(model: Option<E>, status: StatusCode) -> Self {
        match model {
            Some(model) => Self {
                code: model.code(),
                title: model.title(),
                detail: model.message(),
                status,
                field_errors: model.field_errors(),
                error_model: Some(model),
            },
            None => Self {
                code: UNKNOWN_ERROR_CODE.to_string(),
                title: String::new(),
                detail: String::new(),
                status,
                field_errors: HashMap::new(),
                error_model: None,
            },
        }
    }
}

/// Everything a send-and-decode call can fail with.
#[derive(Debug, Error)]
pub enum SendError<E: std::fmt::Debug> {
    /// The transport failed before a classifiable response existed
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A response body could not be parsed into the expected shape.
    ///
    /// Deliberately not folded into [`SendError::Provider`]: a provider
    /// returning schema-invalid payloads is a defect, not a recoverable
    /// condition.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The call was classified as a provider failure
    #[error(transparent)]
    Provider(ProviderError<E>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct MinimalModel {
        error_code: String,
    }

    impl ProviderErrorModel for MinimalModel {
        fn code(&self) -> String {
            format!("Test_{}", self.error_code)
        }
    }

    #[test]
    fn test_contract_defaults_are_empty() {
        let model = MinimalModel {
            error_code: "42".into(),
        };
        assert_eq!(model.code(), "Test_42");
        assert_eq!(model.title(), "");
        assert_eq!(model.message(), "");
        assert!(model.field_errors().is_empty());
    }

    #[test]
    fn test_provider_error_from_model() {
        let model = MinimalModel {
            error_code: "42".into(),
        };
        let error = ProviderError::from_model(Some(model), StatusCode::BAD_REQUEST);
        assert_eq!(error.code, "Test_42");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.error_model.is_some());
    }

    #[test]
    fn test_provider_error_from_missing_model() {
        let error = ProviderError::<MinimalModel>::from_model(None, StatusCode::BAD_GATEWAY);
        assert_eq!(error.code, UNKNOWN_ERROR_CODE);
        assert_eq!(error.title, "");
        assert_eq!(error.detail, "");
        assert!(error.field_errors.is_empty());
        assert!(error.error_model.is_none());
    }

    #[test]
    fn test_display_carries_code_and_status() {
        let error = ProviderError::<MinimalModel>::from_model(None, StatusCode::NOT_FOUND);
        let message = error.to_string();
        assert!(message.contains("Unknown"));
        assert!(message.contains("404"));
    }
}
