//! Payload classification: which submission path a request takes.

use crate::error::{Result, VrtError};
use crate::types::{ImagePayload, Submission, SubmissionRecord};

/// Route a submission is sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPath {
    /// JSON body to `POST /test-runs`.
    Json,
    /// Multipart body with a streamed file to `POST /test-runs/multipart`.
    MultipartFile,
    /// Multipart body with in-memory bytes to `POST /test-runs/multipart`.
    MultipartBytes,
}

impl SubmissionPath {
    pub fn for_payload(image: &ImagePayload) -> Self {
        match image {
            ImagePayload::Base64(_) => SubmissionPath::Json,
            ImagePayload::Path(_) => SubmissionPath::MultipartFile,
            ImagePayload::Bytes(_) => SubmissionPath::MultipartBytes,
        }
    }

    pub fn is_multipart(self) -> bool {
        !matches!(self, SubmissionPath::Json)
    }
}

/// Turn an open record into a [`Submission`], requiring exactly one image field.
pub fn classify(record: SubmissionRecord) -> Result<Submission> {
    let SubmissionRecord {
        options,
        image_base64,
        image_path,
        image_buffer,
    } = record;

    let mut present = Vec::with_capacity(1);
    if let Some(v) = image_base64 {
        present.push(ImagePayload::Base64(v));
    }
    if let Some(v) = image_path {
        present.push(ImagePayload::Path(v));
    }
    if let Some(v) = image_buffer {
        present.push(ImagePayload::Bytes(v));
    }

    match present.len() {
        1 => {
            let image = present.remove(0);
            Ok(Submission::new(options, image))
        }
        0 => Err(VrtError::invalid_payload(format!(
            "'{}' has no image; set one of imageBase64, imagePath, imageBuffer",
            options.name
        ))),
        _ => {
            let kinds: Vec<&str> = present.iter().map(ImagePayload::kind).collect();
            Err(VrtError::invalid_payload(format!(
                "'{}' sets more than one image field: {}",
                options.name,
                kinds.join(", ")
            )))
        }
    }
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = VrtError;

    fn try_from(record: SubmissionRecord) -> Result<Self> {
        classify(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestRunOptions;
    use std::path::PathBuf;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            options: TestRunOptions::new("name"),
            ..SubmissionRecord::default()
        }
    }

    #[test]
    fn single_field_selects_matching_path() {
        let cases = [
            (
                SubmissionRecord {
                    image_base64: Some("aW1n".into()),
                    ..record()
                },
                SubmissionPath::Json,
            ),
            (
                SubmissionRecord {
                    image_path: Some(PathBuf::from("a.png")),
                    ..record()
                },
                SubmissionPath::MultipartFile,
            ),
            (
                SubmissionRecord {
                    image_buffer: Some(vec![1, 2, 3]),
                    ..record()
                },
                SubmissionPath::MultipartBytes,
            ),
        ];

        for (input, expected) in cases {
            let submission = classify(input).expect("exactly one image field");
            assert_eq!(SubmissionPath::for_payload(&submission.image), expected);
            assert_eq!(submission.name(), "name");
        }
    }

    #[test]
    fn no_image_field_is_invalid() {
        let err = classify(record()).unwrap_err();

        assert!(matches!(err, VrtError::InvalidPayload(ref m) if m.contains("no image")));
    }

    #[test]
    fn several_image_fields_are_invalid() {
        let input = SubmissionRecord {
            image_base64: Some("aW1n".into()),
            image_buffer: Some(vec![1]),
            ..record()
        };

        let err = Submission::try_from(input).unwrap_err();

        match err {
            VrtError::InvalidPayload(msg) => {
                assert!(msg.contains("imageBase64"), "{msg}");
                assert!(msg.contains("imageBuffer"), "{msg}");
            }
            other => panic!("expected invalid payload, got {other:?}"),
        }
    }

    #[test]
    fn only_json_path_is_not_multipart() {
        assert!(!SubmissionPath::Json.is_multipart());
        assert!(SubmissionPath::MultipartFile.is_multipart());
        assert!(SubmissionPath::MultipartBytes.is_multipart());
    }
}
