//! Build lifecycle and screenshot submission.
//!
//! [`VisualRegressionTracker`] moves through `Unstarted -> Started -> Stopped`:
//! [`start`](VisualRegressionTracker::start) opens a build and records its
//! [`Session`]; [`track`](VisualRegressionTracker::track) submits screenshots
//! against it; [`stop`](VisualRegressionTracker::stop) closes the build.
//! Submission paths take the `Session` by reference, so nothing reaches the
//! network without a started build.

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{Result, TransportError, VrtError};
use crate::payload::SubmissionPath;
use crate::request::{self, BuildRequest, SessionFields, TestRunJsonBody};
use crate::result::TestRunResult;
use crate::retry::{track_with_retry, DiagnosticCallback, DEFAULT_RETRY_LIMIT};
use crate::types::{BuildResponse, ImagePayload, Submission, TestRunResponse};

/// Identifiers of the build a tracker submits against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    build_id: String,
    project_id: String,
}

impl Session {
    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn from_build(build: &BuildResponse) -> Result<Self> {
        if build.id.is_empty() || build.project_id.is_empty() {
            return Err(TransportError::InvalidResponse(
                "build response is missing id or projectId".to_string(),
            )
            .into());
        }
        Ok(Self {
            build_id: build.id.clone(),
            project_id: build.project_id.clone(),
        })
    }
}

pub struct VisualRegressionTracker {
    config: Config,
    client: ApiClient,
    session: Option<Session>,
    diagnostics: Option<DiagnosticCallback>,
}

impl std::fmt::Debug for VisualRegressionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualRegressionTracker")
            .field("api_url", &self.config.api_url)
            .field("project", &self.config.project)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl VisualRegressionTracker {
    /// Build a tracker from an explicit, already resolved configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config,
            client,
            session: None,
            diagnostics: None,
        })
    }

    /// Build a tracker from `vrt.json` and the `VRT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::load()?)
    }

    /// Route soft-assert failures to `callback` instead of the log.
    pub fn with_diagnostics(mut self, callback: DiagnosticCallback) -> Self {
        self.diagnostics = Some(callback);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.build_id.is_empty() && !s.project_id.is_empty())
    }

    fn started_session(&self) -> Result<&Session> {
        match &self.session {
            Some(session) if self.is_started() => Ok(session),
            _ => Err(VrtError::NotStarted),
        }
    }

    /// Open a build and remember its identifiers.
    ///
    /// A response without usable `id`/`projectId` fails with
    /// [`TransportError::InvalidResponse`] and leaves the tracker unstarted.
    pub async fn start(&mut self) -> Result<BuildResponse> {
        if let Some(previous) = &self.session {
            tracing::warn!(build_id = %previous.build_id, "starting a new build over an open one");
        }
        let build = self
            .client
            .create_build(&BuildRequest::from_config(&self.config))
            .await?;
        let session = Session::from_build(&build)?;
        tracing::debug!(build_id = %session.build_id, project_id = %session.project_id, "build started");
        self.session = Some(session);
        Ok(build)
    }

    /// Close the build. Identifiers are kept; the tracker is meant to be
    /// dropped afterwards.
    pub async fn stop(&self) -> Result<()> {
        let session = self.started_session()?;
        self.client.close_build(&session.build_id).await?;
        tracing::debug!(build_id = %session.build_id, "build stopped");
        Ok(())
    }

    /// Submit a screenshot with the default retry limit.
    pub async fn track(&self, submission: &Submission) -> Result<TestRunResult> {
        self.track_with_retry_limit(submission, DEFAULT_RETRY_LIMIT)
            .await
    }

    /// Submit a screenshot, resubmitting up to `retry_limit` times while the
    /// service reports the diff as unresolved.
    pub async fn track_with_retry_limit(
        &self,
        submission: &Submission,
        retry_limit: u32,
    ) -> Result<TestRunResult> {
        let session = self.started_session()?;
        let path = SubmissionPath::for_payload(&submission.image);
        tracing::debug!(name = %submission.name(), ?path, "tracking screenshot");

        let response = track_with_retry(
            move || self.submit(session, submission),
            retry_limit,
            self.config.enable_soft_assert,
            self.diagnostics.as_ref(),
        )
        .await?;

        Ok(TestRunResult::new(response, &self.config.api_url))
    }

    async fn submit(&self, session: &Session, submission: &Submission) -> Result<TestRunResponse> {
        let fields = self.session_fields(session);
        let options = &submission.options;
        match &submission.image {
            ImagePayload::Base64(image) => {
                let body = TestRunJsonBody::new(fields, options, image);
                self.client.submit_json(&body).await
            }
            ImagePayload::Path(path) => {
                let form = request::file_form(&fields, options, path).await?;
                self.client.submit_multipart(form).await
            }
            ImagePayload::Bytes(bytes) => {
                let form = request::bytes_form(&fields, options, bytes)?;
                self.client.submit_multipart(form).await
            }
        }
    }

    fn session_fields<'a>(&'a self, session: &'a Session) -> SessionFields<'a> {
        SessionFields {
            build_id: &session.build_id,
            project_id: &session.project_id,
            branch_name: &self.config.branch_name,
            baseline_branch_name: self.config.baseline_branch_name.as_deref(),
        }
    }
}
