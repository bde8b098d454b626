use futures_util::StreamExt;
use recap_core::{LogEntry, SessionId};
use recap_logging::{recap_debug, recap_info, recap_warn};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::sse::SseDecoder;
use crate::{ClientSettings, EngineError, EngineEvent, EventSink, ReconnectPolicy, StreamError};

/// Follows `/api/logs/stream` for one session, reconnecting per policy.
#[derive(Debug, Clone)]
pub struct LogStreamer {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl LogStreamer {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        // No overall timeout: the response never ends while the job runs.
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }

    fn stream_url(&self, session_id: &SessionId) -> Result<Url, url::ParseError> {
        let mut url = self.settings.endpoint("/api/logs/stream")?;
        url.query_pairs_mut()
            .append_pair("session_id", session_id.as_str());
        Ok(url)
    }

    /// Runs until `cancel` fires or the reconnect policy gives up.
    ///
    /// Nothing is emitted once `cancel` has fired.
    pub async fn run(&self, session_id: SessionId, cancel: CancellationToken, sink: &dyn EventSink) {
        let policy: ReconnectPolicy = self.settings.reconnect;
        let mut failures: u32 = 0;
        recap_info!(session: session_id; "opening log stream");

        loop {
            let error = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                error = self.follow(&session_id, sink, &mut failures) => error,
            };
            if cancel.is_cancelled() {
                break;
            }

            failures = failures.saturating_add(1);
            if !policy.should_retry(failures) {
                recap_warn!(session: session_id; "giving up on log stream after {} failures: {}", failures, error);
                sink.emit(EngineEvent::StreamGaveUp { session_id });
                return;
            }

            let delay = policy.delay_for(failures);
            recap_warn!(
                session: session_id;
                "log stream interrupted ({}), reconnecting in {:?} (attempt {})",
                error,
                delay,
                failures
            );
            sink.emit(EngineEvent::StreamInterrupted {
                session_id: session_id.clone(),
                attempt: failures,
                error,
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        recap_debug!(session: session_id; "log stream closed");
    }

    /// One connection. Always ends in an error, since a healthy stream only
    /// ends when the server drops it.
    async fn follow(
        &self,
        session_id: &SessionId,
        sink: &dyn EventSink,
        failures: &mut u32,
    ) -> StreamError {
        let url = match self.stream_url(session_id) {
            Ok(url) => url,
            Err(err) => return StreamError::Connect(err.to_string()),
        };
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return StreamError::Connect(err.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            return StreamError::HttpStatus(status.as_u16());
        }
        *failures = 0;

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => return StreamError::Read(err.to_string()),
            };
            for data in decoder.push(&chunk) {
                match serde_json::from_str::<LogEntry>(&data) {
                    Ok(entry) => sink.emit(EngineEvent::LogLine {
                        session_id: session_id.clone(),
                        entry,
                    }),
                    Err(err) => {
                        recap_warn!(session: session_id; "skipping undecodable log payload: {}", err);
                    }
                }
            }
        }
        StreamError::Closed
    }
}
