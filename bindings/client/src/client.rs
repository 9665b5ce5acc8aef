use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use url::Url;

use crate::response::ApiResponse;
use crate::types::{FetchFeedbacksRequest, LoginRequest, RegisterRequest};
use flow_probe_instruments::{OperationRecord, Reporter};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client for the FeedPulse API that times every request it makes.
///
/// Each public method issues one request and records it under a stable operation id. Transport
/// failures and 4xx/5xx responses are both recorded as failed requests; only transport failures
/// surface as errors to the caller, since a bad status is still a response that checks can be run
/// against.
#[derive(Clone)]
pub struct FeedPulseClient {
    http: reqwest::Client,
    base_url: Url,
    reporter: Arc<Reporter>,
}

impl std::fmt::Debug for FeedPulseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedPulseClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl FeedPulseClient {
    pub fn new(base_url: Url, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build the HTTP client")?;

        Ok(Self {
            http,
            base_url,
            reporter,
        })
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    /// `GET /ping`, the unauthenticated health check.
    pub async fn ping(&self) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/ping")?;
        self.execute("ping", self.http.get(url)).await
    }

    /// `POST /api/auth/login`. A successful login carries the session token in the
    /// `Authorization` response header, see [ApiResponse::authorization].
    pub async fn login(&self, request: &LoginRequest) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/auth/login")?;
        self.execute("login", self.http.post(url).json(request))
            .await
    }

    /// `POST /api/auth/register`. Registering an existing user is a 400, which scenario checks
    /// treat as an acceptable outcome.
    pub async fn register(&self, request: &RegisterRequest) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/auth/register")?;
        self.execute("register", self.http.post(url).json(request))
            .await
    }

    /// `GET /api/auth/user`.
    pub async fn user_info(&self, token: &str) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/auth/user")?;
        self.execute("user_info", self.http.get(url).header(AUTHORIZATION, token))
            .await
    }

    /// `GET /api/auth/logout`.
    pub async fn logout(&self, token: &str) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/auth/logout")?;
        self.execute("logout", self.http.get(url).header(AUTHORIZATION, token))
            .await
    }

    /// `GET /api/board/metrics`, the dashboard aggregates.
    pub async fn board_metrics(&self, token: &str) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/board/metrics")?;
        self.execute(
            "board_metrics",
            self.http.get(url).header(AUTHORIZATION, token),
        )
        .await
    }

    /// `POST /api/feedbacks/fetch`, a page of feedback entries.
    pub async fn fetch_feedbacks(
        &self,
        token: &str,
        request: &FetchFeedbacksRequest,
    ) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/feedbacks/fetch")?;
        self.execute(
            "fetch_feedbacks",
            self.http.post(url).header(AUTHORIZATION, token).json(request),
        )
        .await
    }

    /// `GET /api/feedbacks/analyses`.
    pub async fn feedback_analyses(&self, token: &str) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/feedbacks/analyses")?;
        self.execute(
            "feedback_analyses",
            self.http.get(url).header(AUTHORIZATION, token),
        )
        .await
    }

    /// `POST /api/feedbacks/upload`, a multipart upload of a feedback file under the `file` field.
    pub async fn upload_feedbacks(
        &self,
        token: &str,
        file_name: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> anyhow::Result<ApiResponse> {
        let url = self.base_url.join("/api/feedbacks/upload")?;
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);
        self.execute(
            "upload_feedbacks",
            self.http.post(url).header(AUTHORIZATION, token).multipart(form),
        )
        .await
    }

    /// Send one request, recording its duration and outcome under `operation_id`.
    ///
    /// The clock stops once the whole response body has been read, so the recorded duration
    /// matches what a real client would have waited for.
    async fn execute(
        &self,
        operation_id: &str,
        request: RequestBuilder,
    ) -> anyhow::Result<ApiResponse> {
        let mut record = OperationRecord::new(operation_id);

        let outcome = async {
            let response = request.send().await?;
            let status = response.status();
            let authorization = response
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string());
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, authorization, body))
        }
        .await;

        match outcome {
            Ok((status, authorization, body)) => {
                record.finish(status.is_client_error() || status.is_server_error());
                let duration = record.duration().unwrap_or_default();
                log::debug!(
                    "Operation [{}] responded with status [{}] in {:?}",
                    operation_id,
                    status,
                    duration
                );
                self.reporter.add_operation(record);

                Ok(ApiResponse {
                    status,
                    authorization,
                    body,
                    duration,
                })
            }
            Err(e) => {
                record.finish(true);
                self.reporter.add_operation(record);
                Err(e).with_context(|| format!("Request failed for operation [{}]", operation_id))
            }
        }
    }
}
