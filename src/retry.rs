//! Retry-and-verdict loop and the soft/hard assert failure policy.

use std::future::Future;
use std::sync::Arc;

use crate::error::{AssertionFailure, Result};
use crate::types::{TestRunResponse, TestStatus};

/// Retries after the first attempt when none is given.
pub const DEFAULT_RETRY_LIMIT: u32 = 2;

/// Receives soft-assert failure messages in place of the default log channel.
pub type DiagnosticCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Failure a terminal verdict represents, if any.
pub fn assertion_for(response: &TestRunResponse) -> Option<AssertionFailure> {
    let url = response.url.clone();
    match response.status {
        TestStatus::New => Some(AssertionFailure::NoBaseline { url }),
        TestStatus::Unresolved => Some(AssertionFailure::DifferenceFound { url }),
        TestStatus::Ok | TestStatus::AutoApproved => None,
    }
}

/// Only a pending diff is worth waiting for.
pub fn should_stop_retry(response: &TestRunResponse) -> bool {
    response.status != TestStatus::Unresolved
}

/// Apply the failure policy to a terminal verdict.
///
/// With `soft_assert` the failure is reported through `diagnostics` (or
/// `tracing::error!` when none is set) and `Ok(())` is returned; otherwise the
/// failure is returned as an error.
pub fn process_test_run(
    response: &TestRunResponse,
    soft_assert: bool,
    diagnostics: Option<&DiagnosticCallback>,
) -> Result<()> {
    let Some(failure) = assertion_for(response) else {
        return Ok(());
    };

    if !soft_assert {
        return Err(failure.into());
    }

    let message = failure.to_string();
    match diagnostics {
        Some(report) => report(&message),
        None => tracing::error!("{message}"),
    }
    Ok(())
}

/// Submit until the verdict is no longer `unresolved` or `retry_limit` retries
/// are spent, then apply [`process_test_run`] to the last verdict.
///
/// `submit` runs at most `retry_limit + 1` times, one request at a time.
/// Errors from `submit` end the loop immediately.
pub async fn track_with_retry<F, Fut>(
    mut submit: F,
    retry_limit: u32,
    soft_assert: bool,
    diagnostics: Option<&DiagnosticCallback>,
) -> Result<TestRunResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TestRunResponse>>,
{
    let mut remaining = retry_limit;
    loop {
        let response = submit().await?;
        if remaining == 0 || should_stop_retry(&response) {
            process_test_run(&response, soft_assert, diagnostics)?;
            return Ok(response);
        }
        tracing::info!("Diff found... Remaining retry attempts **{remaining}**");
        remaining -= 1;
    }
}
