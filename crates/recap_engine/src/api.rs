use std::time::Duration;

use recap_core::{JobPayload, JobResult, SessionId, VideoSource};
use recap_logging::{recap_debug, recap_info};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{CleanupError, EngineError, FailureKind, ReconnectPolicy, RequestError};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";
const DEFAULT_PROCESS_ERROR: &str = "Processing failed. Please check your input and try again.";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: Url,
    pub connect_timeout: Duration,
    /// `None` waits as long as the server keeps the request open.
    pub process_timeout: Option<Duration>,
    pub cleanup_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl ClientSettings {
    pub fn new(server_url: &str) -> Result<Self, EngineError> {
        Ok(Self {
            server_url: Url::parse(server_url)?,
            connect_timeout: Duration::from_secs(10),
            process_timeout: Some(Duration::from_secs(60 * 60)),
            cleanup_timeout: Duration::from_secs(15),
            reconnect: ReconnectPolicy::default(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.server_url.join(path)
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, EngineError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))
    }
}

/// Backend calls made for a job, apart from the log stream.
#[async_trait::async_trait]
pub trait RecapApi: Send + Sync {
    async fn process(
        &self,
        session_id: &SessionId,
        payload: &JobPayload,
    ) -> Result<JobResult, RequestError>;

    async fn cleanup(&self, session_id: &SessionId) -> Result<(), CleanupError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRecapApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestRecapApi {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }

    async fn build_form(
        &self,
        session_id: &SessionId,
        payload: &JobPayload,
    ) -> Result<Form, RequestError> {
        let mut form = Form::new();
        match &payload.source {
            VideoSource::File(path) => {
                let local_error = |err: std::io::Error| {
                    RequestError::new(
                        FailureKind::LocalFile,
                        format!("Could not read video file {}: {err}", path.display()),
                    )
                };
                let file = tokio::fs::File::open(path).await.map_err(local_error)?;
                let len = file.metadata().await.map_err(local_error)?.len();
                let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
                form = form.part(
                    "video",
                    Part::stream_with_length(body, len).file_name(payload.source.label()),
                );
            }
            VideoSource::DriveUrl(url) => {
                form = form.text("drive_url", url.clone());
            }
        }
        if let Some(instructions) = &payload.instructions {
            form = form.text("instructions", instructions.clone());
        }
        Ok(form
            .text("script_text", payload.script_text.clone())
            .text("movie_title", payload.movie_title.clone())
            .text("session_id", session_id.to_string()))
    }
}

#[async_trait::async_trait]
impl RecapApi for ReqwestRecapApi {
    async fn process(
        &self,
        session_id: &SessionId,
        payload: &JobPayload,
    ) -> Result<JobResult, RequestError> {
        let url = self
            .settings
            .endpoint("/api/process")
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        let form = self.build_form(session_id, payload).await?;

        let mut request = self.client.post(url).multipart(form);
        if let Some(timeout) = self.settings.process_timeout {
            request = request.timeout(timeout);
        }
        recap_info!(session: session_id; "submitting processing request");
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| DEFAULT_PROCESS_ERROR.to_string());
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        serde_json::from_slice(&body).map_err(|err| {
            RequestError::new(
                FailureKind::Decode,
                format!("Unexpected response from server: {err}"),
            )
        })
    }

    async fn cleanup(&self, session_id: &SessionId) -> Result<(), CleanupError> {
        let url = self
            .settings
            .endpoint("/api/cleanup")
            .map_err(|err| CleanupError::Network(err.to_string()))?;
        let body = serde_json::json!({ "session_id": session_id.as_str() }).to_string();

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.settings.cleanup_timeout)
            .body(body)
            .send()
            .await
            .map_err(|err| CleanupError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CleanupError::HttpStatus(status.as_u16()));
        }
        recap_debug!(session: session_id; "cleanup accepted with status {}", status);
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()?
        .error
        .filter(|message| !message.trim().is_empty())
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, "The server took too long to respond.");
    }
    RequestError::new(
        FailureKind::Network,
        format!("Could not reach the server: {err}"),
    )
}
