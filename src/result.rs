use serde::{Deserialize, Serialize};

use crate::types::TestRunResponse;

/// A verdict together with the URLs of its stored images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResult {
    pub test_run_response: TestRunResponse,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_url: Option<String>,
}

impl TestRunResult {
    pub fn new(test_run_response: TestRunResponse, api_url: &str) -> Self {
        let link = |name: &str| format!("{api_url}/{name}");
        Self {
            image_url: link(&test_run_response.image_name),
            diff_url: test_run_response.diff_name.as_deref().map(link),
            baseline_url: test_run_response.baseline_name.as_deref().map(link),
            test_run_response,
        }
    }
}
