//! Data types exchanged with the VRT service.
//!
//! - [`core`] - what the caller submits: [`Submission`], [`ImagePayload`], [`IgnoreArea`]
//! - [`response`] - what the service answers: [`TestRunResponse`], [`TestStatus`], [`BuildResponse`]

pub mod core;
pub mod response;

pub use self::core::{IgnoreArea, ImagePayload, Submission, SubmissionRecord, TestRunOptions};
pub use self::response::{BuildResponse, TestRunResponse, TestStatus};
