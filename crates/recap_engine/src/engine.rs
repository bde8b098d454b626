use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use recap_core::{JobPayload, SessionId};
use recap_logging::{recap_debug, recap_warn};
use tokio_util::sync::CancellationToken;

use crate::api::{ClientSettings, RecapApi, ReqwestRecapApi};
use crate::sink::ChannelEventSink;
use crate::stream::LogStreamer;
use crate::{EngineError, EngineEvent};

enum EngineCommand {
    OpenLogStream { session_id: SessionId },
    CloseLogStream,
    Process {
        session_id: SessionId,
        payload: JobPayload,
    },
    Cleanup { session_id: SessionId },
}

/// Runs backend IO on its own tokio runtime and hands results back over a
/// channel, so the caller never blocks on the network.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let api: Arc<dyn RecapApi> = Arc::new(ReqwestRecapApi::new(settings.clone())?);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let streamer = Arc::new(LogStreamer::new(settings)?);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("recap-engine-io")
            .build()?;

        thread::Builder::new()
            .name("recap-engine".to_string())
            .spawn(move || {
                let mut active_stream: Option<CancellationToken> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::OpenLogStream { session_id } => {
                            if let Some(previous) = active_stream.take() {
                                previous.cancel();
                            }
                            let token = CancellationToken::new();
                            active_stream = Some(token.clone());
                            let streamer = streamer.clone();
                            let sink = ChannelEventSink::new(event_tx.clone());
                            runtime.spawn(async move {
                                streamer.run(session_id, token, &sink).await;
                            });
                        }
                        EngineCommand::CloseLogStream => {
                            if let Some(token) = active_stream.take() {
                                recap_debug!("closing log stream");
                                token.cancel();
                            }
                        }
                        EngineCommand::Process {
                            session_id,
                            payload,
                        } => {
                            let api = api.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = api.process(&session_id, &payload).await;
                                let _ = event_tx.send(EngineEvent::ProcessFinished {
                                    session_id,
                                    result,
                                });
                            });
                        }
                        EngineCommand::Cleanup { session_id } => {
                            let api = api.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = api.cleanup(&session_id).await;
                                if let Err(err) = &result {
                                    recap_warn!(session: session_id; "cleanup failed: {}", err);
                                }
                                let _ = event_tx.send(EngineEvent::CleanupFinished {
                                    session_id,
                                    result,
                                });
                            });
                        }
                    }
                }
                if let Some(token) = active_stream.take() {
                    token.cancel();
                }
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    /// Follow the log stream of `session_id`, replacing any stream already open.
    pub fn open_log_stream(&self, session_id: SessionId) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::OpenLogStream { session_id });
    }

    pub fn close_log_stream(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CloseLogStream);
    }

    pub fn process(&self, session_id: SessionId, payload: JobPayload) {
        let _ = self.cmd_tx.send(EngineCommand::Process {
            session_id,
            payload,
        });
    }

    pub fn cleanup(&self, session_id: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cleanup { session_id });
    }

    /// Blocks for at most `timeout` waiting for the next event. `Ok(None)`
    /// means nothing arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}
