use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vrt_lib::{
    classify, Config, ConfigLayer, ImagePayload, Result, RunOutput, Submission, SubmissionRecord,
    TrackOutcome, VisualRegressionTracker, VrtError, VrtOutput, VRT_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for_run, render_error, write_output};

/// Run the `run` command: start a build, track every manifest entry, stop.
pub async fn run_tracking(
    config_path: PathBuf,
    manifest: PathBuf,
    retry_limit: u32,
    soft_assert: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match Config::resolve(None, Some(&config_path), ConfigLayer::from_env()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    if soft_assert {
        config.enable_soft_assert = true;
    }

    // Classify everything up front so a bad entry fails before any request.
    let submissions = match load_manifest(&manifest) {
        Ok(submissions) => submissions,
        Err(err) => return render_error(err, format, output),
    };
    tracing::debug!(count = submissions.len(), manifest = %manifest.display(), "manifest loaded");

    let mut tracker = match VisualRegressionTracker::new(config) {
        Ok(tracker) => tracker,
        Err(err) => return render_error(err, format, output),
    };
    let build = match tracker.start().await {
        Ok(build) => build,
        Err(err) => return render_error(err, format, output),
    };
    tracing::info!(build_id = %build.id, "build started");

    let mut results = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        match tracker.track_with_retry_limit(submission, retry_limit).await {
            Ok(result) => results.push(TrackOutcome {
                name: submission.name().to_string(),
                passed: !result.test_run_response.status.is_failure(),
                result: Some(result),
                failure: None,
            }),
            Err(VrtError::Assertion(failure)) => results.push(TrackOutcome {
                name: submission.name().to_string(),
                passed: false,
                result: None,
                failure: Some(failure.to_string()),
            }),
            Err(err) => {
                if let Err(stop_err) = tracker.stop().await {
                    tracing::warn!(error = %stop_err, "failed to stop build after error");
                }
                return render_error(err, format, output);
            }
        }
    }

    if let Err(err) = tracker.stop().await {
        return render_error(err, format, output);
    }

    // Soft-asserted failures are reported but do not fail the process.
    let hard_failure = results.iter().any(|r| r.failure.is_some());
    let body = VrtOutput::Run(RunOutput {
        version: VRT_OUTPUT_VERSION.to_string(),
        build_id: build.id,
        project_id: build.project_id,
        passed: results.iter().all(|r| r.passed),
        results,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(VrtError::config(err.to_string()), format, output);
    }
    exit_code_for_run(!hard_failure)
}

/// Read a manifest and classify each entry. Relative image paths are resolved
/// against the manifest's directory.
pub fn load_manifest(path: &Path) -> Result<Vec<Submission>> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<SubmissionRecord> = serde_json::from_str(&raw)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    records
        .into_iter()
        .map(|record| -> Result<Submission> {
            let mut submission = classify(record)?;
            if let ImagePayload::Path(image) = &mut submission.image {
                if image.is_relative() {
                    *image = base.join(&*image);
                }
            }
            Ok(submission)
        })
        .collect()
}
