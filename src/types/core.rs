//! Submission types.
//!
//! A [`Submission`] is one screenshot comparison request. Its image travels in
//! exactly one of three encodings, modelled by [`ImagePayload`]. Callers that
//! start from loosely-typed input (JSON manifests) use [`SubmissionRecord`] and
//! convert it through the payload classifier.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rectangle in image pixel space excluded from comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fields shared by every submission regardless of the image encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunOptions {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_tollerance_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_areas: Option<Vec<IgnoreArea>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

impl TestRunOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The screenshot itself, in one of the encodings the service accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Base64 text sent inline in a JSON body.
    Base64(String),
    /// File on disk streamed as a multipart attachment.
    Path(PathBuf),
    /// In-memory bytes sent as a multipart attachment.
    Bytes(Vec<u8>),
}

impl ImagePayload {
    /// Encode raw image bytes for the inline JSON path.
    pub fn base64_from_bytes(bytes: &[u8]) -> Self {
        ImagePayload::Base64(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImagePayload::Base64(_) => "imageBase64",
            ImagePayload::Path(_) => "imagePath",
            ImagePayload::Bytes(_) => "imageBuffer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub options: TestRunOptions,
    pub image: ImagePayload,
}

impl Submission {
    pub fn new(options: TestRunOptions, image: ImagePayload) -> Self {
        Self { options, image }
    }

    pub fn base64(name: impl Into<String>, image_base64: impl Into<String>) -> Self {
        Self::new(
            TestRunOptions::new(name),
            ImagePayload::Base64(image_base64.into()),
        )
    }

    pub fn path(name: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self::new(
            TestRunOptions::new(name),
            ImagePayload::Path(image_path.into()),
        )
    }

    pub fn bytes(name: impl Into<String>, image_buffer: impl Into<Vec<u8>>) -> Self {
        Self::new(
            TestRunOptions::new(name),
            ImagePayload::Bytes(image_buffer.into()),
        )
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }
}

/// Open record form of a submission, as found in JSON manifests. Any number of
/// image fields may be present; [`crate::payload::classify`] accepts only one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub options: TestRunOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_buffer: Option<Vec<u8>>,
}
