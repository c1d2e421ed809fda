//! HTTP transport for the VRT API.
//!
//! Every failed exchange is funnelled through [`classify_failure`]; nothing
//! else in the crate looks at status codes.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{classify_failure, Result, TransportError, VrtError};
use crate::types::{BuildResponse, TestRunResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "apikey";
const PROJECT_HEADER: &str = "project";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(VrtError::config(format!(
                "apiUrl cannot be used as a base URL: {}",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value("apiKey", &config.api_key)?,
        );
        headers.insert(
            HeaderName::from_static(PROJECT_HEADER),
            header_value("project", &config.project)?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| VrtError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /builds`
    pub async fn create_build<B: Serialize + ?Sized>(&self, body: &B) -> Result<BuildResponse> {
        let url = self.endpoint(&["builds"]);
        self.send_json(self.http.post(url).json(body)).await
    }

    /// `PATCH /builds/{buildId}`
    pub async fn close_build(&self, build_id: &str) -> Result<()> {
        let url = self.endpoint(&["builds", build_id]);
        self.execute(self.http.patch(url)).await.map(|_| ())
    }

    /// `POST /test-runs`
    pub async fn submit_json<B: Serialize + ?Sized>(&self, body: &B) -> Result<TestRunResponse> {
        let url = self.endpoint(&["test-runs"]);
        self.send_json(self.http.post(url).json(body)).await
    }

    /// `POST /test-runs/multipart`
    pub async fn submit_multipart(&self, form: Form) -> Result<TestRunResponse> {
        let url = self.endpoint(&["test-runs", "multipart"]);
        self.send_json(self.http.post(url).multipart(form)).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| VrtError::Transport(TransportError::InvalidResponse(e.to_string())))
    }

    /// Send the request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "request failed without a response");
                return Err(classify_failure(None).into());
            }
        };

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "VRT response");
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            return Ok(body);
        }
        Err(classify_failure(Some((status, body))).into())
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| VrtError::config(format!("{field} contains characters not allowed in a header")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> Config {
        Config {
            api_url: api_url.into(),
            branch_name: "develop".into(),
            project: "project".into(),
            api_key: "key".into(),
            ..Config::default()
        }
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = ApiClient::new(&config("http://localhost:4200/api/")).unwrap();

        assert_eq!(
            client.endpoint(&["test-runs", "multipart"]).as_str(),
            "http://localhost:4200/api/test-runs/multipart"
        );
    }

    #[test]
    fn endpoint_escapes_build_id() {
        let client = ApiClient::new(&config("http://localhost:4200")).unwrap();

        assert_eq!(
            client.endpoint(&["builds", "a/b"]).as_str(),
            "http://localhost:4200/builds/a%2Fb"
        );
    }

    #[test]
    fn rejects_api_key_unfit_for_header() {
        let mut cfg = config("http://localhost:4200");
        cfg.api_key = "bad\nkey".into();

        assert!(matches!(ApiClient::new(&cfg), Err(VrtError::Config(_))));
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(matches!(
            ApiClient::new(&config("mailto:someone@example.com")),
            Err(VrtError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_no_response() {
        let client = ApiClient::new(&config("http://127.0.0.1:1")).unwrap();

        let result = client.close_build("build").await;

        assert!(
            matches!(result, Err(VrtError::Transport(TransportError::NoResponse))),
            "expected no response, got {:?}",
            result
        );
    }
}
