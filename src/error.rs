use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum VrtError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Visual Regression Tracker has not been started")]
    NotStarted,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),
}

/// Failure of a request against the VRT service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Api key not authenticated")]
    ApiKeyRejected,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("No response from server")]
    NoResponse,

    #[error("{0}")]
    ServerError(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// Verdict that fails the test run once retries are exhausted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionFailure {
    #[error("No baseline: {url}")]
    NoBaseline { url: String },

    #[error("Difference found: {url}")]
    DifferenceFound { url: String },
}

impl AssertionFailure {
    pub fn url(&self) -> &str {
        match self {
            AssertionFailure::NoBaseline { url } | AssertionFailure::DifferenceFound { url } => url,
        }
    }
}

/// Status codes with a dedicated error; everything else is a `ServerError`.
const STATUS_ERRORS: [(StatusCode, TransportError); 3] = [
    (StatusCode::UNAUTHORIZED, TransportError::Unauthorized),
    (StatusCode::FORBIDDEN, TransportError::ApiKeyRejected),
    (StatusCode::NOT_FOUND, TransportError::ProjectNotFound),
];

/// Map a failed exchange to a domain error.
///
/// `response` is `None` when the request never produced a response (connection
/// refused, timeout, ...), otherwise the status and the raw response body.
pub fn classify_failure(response: Option<(StatusCode, String)>) -> TransportError {
    let Some((status, body)) = response else {
        return TransportError::NoResponse;
    };

    STATUS_ERRORS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, err)| err.clone())
        .unwrap_or(TransportError::ServerError(body))
}

impl VrtError {
    pub fn config(message: impl Into<String>) -> Self {
        VrtError::Config(message.into())
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        VrtError::InvalidPayload(message.into())
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, VrtError::Assertion(_))
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            VrtError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Set apiUrl/apiKey/project/branchName in vrt.json or the VRT_* environment variables.",
            ),
            VrtError::NotStarted => ErrorPayload::new(
                ErrorCategory::Session,
                self.to_string(),
                "Call start() before tracking screenshots or stopping the build.",
            ),
            VrtError::InvalidPayload(msg) => ErrorPayload::new(
                ErrorCategory::Payload,
                msg.to_string(),
                "Provide exactly one of imageBase64, imagePath or imageBuffer per submission.",
            ),
            VrtError::Transport(err) => {
                let remediation = match err {
                    TransportError::Unauthorized | TransportError::ApiKeyRejected => {
                        "Check the apiKey (VRT_APIKEY) against the user profile on the VRT server."
                    }
                    TransportError::ProjectNotFound => {
                        "Check the project name or id (VRT_PROJECT) exists on the VRT server."
                    }
                    TransportError::NoResponse => {
                        "Check apiUrl (VRT_APIURL) and connectivity to the VRT server."
                    }
                    TransportError::ServerError(_) | TransportError::InvalidResponse(_) => {
                        "Inspect the server response; check VRT server logs and version."
                    }
                };
                ErrorPayload::new(ErrorCategory::Network, err.to_string(), remediation)
            }
            VrtError::Assertion(err) => ErrorPayload::new(
                ErrorCategory::Assertion,
                err.to_string(),
                "Review the test run in the VRT UI and approve or reject it.",
            ),
            VrtError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            VrtError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON inputs (vrt.json, manifest) for syntax errors.",
            ),
            VrtError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify apiUrl format (e.g., http://localhost:4200).",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, VrtError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Session,
    Payload,
    Network,
    Assertion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_response_maps_to_no_response() {
        let err = classify_failure(None);

        assert_eq!(err, TransportError::NoResponse);
        assert_eq!(err.to_string(), "No response from server");
    }

    #[test]
    fn known_statuses_map_to_dedicated_errors() {
        let cases = [
            (401, TransportError::Unauthorized, "Unauthorized"),
            (403, TransportError::ApiKeyRejected, "Api key not authenticated"),
            (404, TransportError::ProjectNotFound, "Project not found"),
        ];

        for (code, expected, message) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let err = classify_failure(Some((status, "{}".to_string())));
            assert_eq!(err, expected, "status {code}");
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn other_statuses_carry_body_verbatim() {
        let body = r#"{"some":"data"}"#.to_string();
        let err = classify_failure(Some((StatusCode::INTERNAL_SERVER_ERROR, body.clone())));

        assert_eq!(err, TransportError::ServerError(body.clone()));
        assert_eq!(err.to_string(), body);
    }

    #[test]
    fn bad_request_is_a_server_error() {
        let err = classify_failure(Some((StatusCode::BAD_REQUEST, "bad".to_string())));

        assert!(matches!(err, TransportError::ServerError(ref b) if b == "bad"));
    }

    #[test]
    fn assertion_payload_keeps_message() {
        let err = VrtError::from(AssertionFailure::DifferenceFound {
            url: "http://h/test/1".into(),
        });
        let payload = err.to_payload();

        assert_eq!(payload.category, ErrorCategory::Assertion);
        assert_eq!(payload.message, "Difference found: http://h/test/1");
        assert!(err.is_assertion());
    }

    #[test]
    fn auth_failures_point_at_api_key() {
        let err = VrtError::from(TransportError::ApiKeyRejected);
        let remediation = err.to_payload().remediation.unwrap_or_default();

        assert!(
            remediation.contains("apiKey"),
            "expected apiKey remediation, got: {remediation}"
        );
    }
}
