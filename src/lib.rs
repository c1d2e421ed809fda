//! Visual Regression Tracker (VRT) client library.
//!
//! Drives a remote VRT service: open a build, submit screenshots against it,
//! interpret each verdict, and close the build. Image comparison happens on
//! the server.
//!
//! # Module Overview
//!
//! - [`tracker`] - Build lifecycle and screenshot submission
//! - [`retry`] - Retry-until-stable verdict loop and soft/hard assert policy
//! - [`payload`] - Classification of submissions into JSON or multipart paths
//! - [`request`] - Request bodies (JSON and multipart)
//! - [`client`] - HTTP transport and error mapping
//! - [`config`] - Configuration from explicit values, `vrt.json` or `VRT_*` env vars
//! - [`result`] - Verdicts decorated with image URLs
//! - [`output`] - JSON output schemas for the `vrt` binary
//! - [`types`] - Submission and response records
//!
//! # Example
//!
//! ```no_run
//! use vrt_lib::{Submission, VisualRegressionTracker};
//!
//! # async fn example() -> vrt_lib::Result<()> {
//! let mut tracker = VisualRegressionTracker::from_env()?;
//! tracker.start().await?;
//!
//! let result = tracker.track(&Submission::path("home page", "shots/home.png")).await?;
//! println!("stored at {}", result.image_url);
//!
//! tracker.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod payload;
pub mod request;
pub mod result;
pub mod retry;
pub mod tracker;
pub mod types;

pub use client::ApiClient;
pub use config::{Config, ConfigLayer, CONFIG_FILE_PATH};
pub use error::{
    classify_failure, AssertionFailure, ErrorCategory, ErrorPayload, Result, TransportError,
    VrtError,
};
pub use output::{ErrorOutput, RunOutput, TrackOutcome, VrtOutput, VRT_OUTPUT_VERSION};
pub use payload::{classify, SubmissionPath};
pub use result::TestRunResult;
pub use retry::{
    process_test_run, should_stop_retry, track_with_retry, DiagnosticCallback,
    DEFAULT_RETRY_LIMIT,
};
pub use tracker::{Session, VisualRegressionTracker};
pub use types::{
    BuildResponse, IgnoreArea, ImagePayload, Submission, SubmissionRecord, TestRunOptions,
    TestRunResponse, TestStatus,
};
