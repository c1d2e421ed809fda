use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::result::TestRunResult;

/// Schema version for output payloads.
pub const VRT_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum VrtOutput {
    Run(RunOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub version: String,
    pub build_id: String,
    pub project_id: String,
    pub passed: bool,
    pub results: Vec<TrackOutcome>,
}

/// Outcome of tracking one manifest entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutcome {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestRunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn error_output_is_tagged_with_mode() {
        let out = VrtOutput::Error(ErrorOutput {
            version: VRT_OUTPUT_VERSION.to_string(),
            message: None,
            error: ErrorPayload::new(ErrorCategory::Network, "Unauthorized".into(), "hint"),
        });

        let value = serde_json::to_value(&out).unwrap();

        assert_eq!(value["mode"], "error");
        assert_eq!(value["error"]["category"], "network");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn outcome_omits_absent_result() {
        let outcome = TrackOutcome {
            name: "home".into(),
            passed: false,
            result: None,
            failure: Some("No baseline: http://h/1".into()),
        };

        let value = serde_json::to_value(&outcome).unwrap();

        assert!(value.get("result").is_none());
        assert_eq!(value["failure"], "No baseline: http://h/1");
    }
}
