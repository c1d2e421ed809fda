//! Records returned by the VRT service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service classification of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    New,
    Ok,
    Unresolved,
    AutoApproved,
}

impl TestStatus {
    /// Statuses that fail the run once no more retries are pending.
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::New | TestStatus::Unresolved)
    }
}

/// Verdict for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResponse {
    pub id: String,
    pub image_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_name: Option<String>,
    pub diff_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_tollerance_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_mis_match_count: Option<u64>,
    pub status: TestStatus,
    pub url: String,
    #[serde(default)]
    pub merge: bool,
}

/// Build record returned by build creation. Only the identifiers are
/// interpreted; everything else is kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub id: String,
    pub project_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
