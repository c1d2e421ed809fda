//! Request bodies for the VRT API.
//!
//! Session identifiers and branch names always come from the tracker, never
//! from the caller's submission.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Serialize;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::config::Config;
use crate::error::{Result, VrtError};
use crate::types::TestRunOptions;

const BYTES_FILE_NAME: &str = "image.png";

/// Body of `POST /builds`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest<'a> {
    pub branch_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_branch_name: Option<&'a str>,
    pub project: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_build_id: Option<&'a str>,
}

impl<'a> BuildRequest<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            branch_name: &config.branch_name,
            baseline_branch_name: config.baseline_branch_name.as_deref(),
            project: &config.project,
            ci_build_id: config.ci_build_id.as_deref(),
        }
    }
}

/// Fields every test-run submission carries alongside the caller's options.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFields<'a> {
    pub build_id: &'a str,
    pub project_id: &'a str,
    pub branch_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_branch_name: Option<&'a str>,
}

/// Body of `POST /test-runs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunJsonBody<'a> {
    #[serde(flatten)]
    pub session: SessionFields<'a>,
    #[serde(flatten)]
    pub options: &'a TestRunOptions,
    pub image_base64: &'a str,
}

impl<'a> TestRunJsonBody<'a> {
    pub fn new(session: SessionFields<'a>, options: &'a TestRunOptions, image_base64: &'a str) -> Self {
        Self {
            session,
            options,
            image_base64,
        }
    }
}

/// Multipart body streaming the image from `path` with its known length.
pub async fn file_form(
    session: &SessionFields<'_>,
    options: &TestRunOptions,
    path: &Path,
) -> Result<Form> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| image_io_error(path, e))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| image_io_error(path, e))?
        .len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| BYTES_FILE_NAME.to_string());

    let stream = FramedRead::new(file, BytesCodec::new());
    let part = Part::stream_with_length(Body::wrap_stream(stream), length).file_name(file_name);

    Ok(base_form(session, options)?.part("image", part))
}

/// Multipart body carrying the image as an in-memory attachment.
pub fn bytes_form(
    session: &SessionFields<'_>,
    options: &TestRunOptions,
    bytes: &[u8],
) -> Result<Form> {
    let part = Part::bytes(bytes.to_vec()).file_name(BYTES_FILE_NAME);
    Ok(base_form(session, options)?.part("image", part))
}

fn base_form(session: &SessionFields<'_>, options: &TestRunOptions) -> Result<Form> {
    let mut form = Form::new()
        .text("buildId", session.build_id.to_string())
        .text("projectId", session.project_id.to_string())
        .text("branchName", session.branch_name.to_string());
    if let Some(baseline) = session.baseline_branch_name {
        form = form.text("baselineBranchName", baseline.to_string());
    }
    form = form.text("name", options.name.clone());

    let optional = [
        ("os", &options.os),
        ("browser", &options.browser),
        ("viewport", &options.viewport),
        ("device", &options.device),
        ("customTags", &options.custom_tags),
        ("comment", &options.comment),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            form = form.text(key, value.clone());
        }
    }
    if let Some(areas) = &options.ignore_areas {
        form = form.text("ignoreAreas", serde_json::to_string(areas)?);
    }
    if let Some(percent) = options.diff_tollerance_percent {
        form = form.text("diffTollerancePercent", percent.to_string());
    }
    if let Some(merge) = options.merge {
        form = form.text("merge", merge.to_string());
    }
    Ok(form)
}

fn image_io_error(path: &Path, err: std::io::Error) -> VrtError {
    VrtError::Io(std::io::Error::new(
        err.kind(),
        format!("failed to read image {}: {}", path.display(), err),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IgnoreArea;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn session() -> SessionFields<'static> {
        SessionFields {
            build_id: "build",
            project_id: "project",
            branch_name: "develop",
            baseline_branch_name: None,
        }
    }

    #[test]
    fn build_request_omits_unset_fields() {
        let config = Config {
            api_url: "http://localhost:4200".into(),
            branch_name: "develop".into(),
            project: "Default project".into(),
            api_key: "key".into(),
            ..Config::default()
        };

        let value = serde_json::to_value(BuildRequest::from_config(&config)).unwrap();

        assert_eq!(value, json!({"branchName": "develop", "project": "Default project"}));
    }

    #[test]
    fn json_body_merges_session_and_options() {
        let mut options = TestRunOptions::new("name");
        options.os = Some("os".into());
        options.ignore_areas = Some(vec![IgnoreArea {
            x: 1,
            y: 2,
            width: 400,
            height: 300,
        }]);
        let session = SessionFields {
            baseline_branch_name: Some("main"),
            ..session()
        };

        let value = serde_json::to_value(TestRunJsonBody::new(session, &options, "iamge")).unwrap();

        assert_eq!(
            value,
            json!({
                "buildId": "build",
                "projectId": "project",
                "branchName": "develop",
                "baselineBranchName": "main",
                "name": "name",
                "os": "os",
                "ignoreAreas": [{"x": 1, "y": 2, "width": 400, "height": 300}],
                "imageBase64": "iamge"
            })
        );
    }

    #[tokio::test]
    async fn file_form_reads_existing_image() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("shot.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let form = file_form(&session(), &TestRunOptions::new("name"), &path).await;

        assert!(form.is_ok(), "expected form, got {:?}", form.err());
    }

    #[tokio::test]
    async fn file_form_reports_missing_image() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing.png");

        let err = file_form(&session(), &TestRunOptions::new("name"), &path)
            .await
            .unwrap_err();

        match err {
            VrtError::Io(e) => assert!(e.to_string().contains("missing.png"), "{e}"),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn bytes_form_accepts_all_options() {
        let options = TestRunOptions {
            name: "name".into(),
            browser: Some("chrome".into()),
            diff_tollerance_percent: Some(0.123),
            ignore_areas: Some(vec![]),
            merge: Some(true),
            ..TestRunOptions::default()
        };

        assert!(bytes_form(&session(), &options, &[1, 2, 3]).is_ok());
    }
}
