use std::time::Duration;

use recap_core::{Effect, Msg};
use recap_engine::{EngineError, EngineEvent, EngineHandle};
use recap_logging::{recap_info, recap_warn};

/// What the run loop needs from the IO side.
pub trait Backend {
    fn execute(&self, effects: Vec<Effect>);

    /// `Ok(None)` when nothing arrived within `timeout`.
    fn next_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError>;
}

/// Hands reducer effects to the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

impl Backend for EffectRunner {
    fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenLogStream { session_id } => {
                    self.engine.open_log_stream(session_id);
                }
                Effect::CloseLogStream => self.engine.close_log_stream(),
                Effect::SubmitJob {
                    session_id,
                    payload,
                } => {
                    recap_info!(
                        session: session_id;
                        "submitting job source={} script_len={}",
                        payload.source.label(),
                        payload.script_text.len()
                    );
                    self.engine.process(session_id, payload);
                }
                Effect::CleanupSession { session_id } => {
                    recap_info!(session: session_id; "requesting cleanup");
                    self.engine.cleanup(session_id);
                }
            }
        }
    }

    fn next_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        self.engine.recv_timeout(timeout)
    }
}

/// Message for an engine event. Cleanup outcomes stay in the shell.
pub fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::LogLine { session_id, entry } => Some(Msg::LogReceived { session_id, entry }),
        EngineEvent::StreamInterrupted {
            session_id,
            attempt,
            error,
        } => {
            recap_warn!(session: session_id; "log stream attempt {} failed: {}", attempt, error);
            Some(Msg::LogStreamInterrupted {
                session_id,
                attempt,
            })
        }
        EngineEvent::StreamGaveUp { session_id } => Some(Msg::LogStreamGaveUp { session_id }),
        EngineEvent::ProcessFinished { session_id, result } => Some(match result {
            Ok(result) => Msg::ProcessingSucceeded { session_id, result },
            Err(err) => {
                recap_warn!(session: session_id; "processing failed ({:?}): {}", err.kind, err);
                Msg::ProcessingFailed {
                    session_id,
                    message: err.message,
                }
            }
        }),
        EngineEvent::CleanupFinished { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::{JobResult, LogEntry, LogLevel, SessionId};
    use recap_engine::StreamError;

    #[test]
    fn log_lines_become_messages() {
        let entry = LogEntry::new(LogLevel::Info, "Step 2: Downloading video");
        let msg = map_event(EngineEvent::LogLine {
            session_id: SessionId::new("s1"),
            entry: entry.clone(),
        });
        assert_eq!(
            msg,
            Some(Msg::LogReceived {
                session_id: SessionId::new("s1"),
                entry
            })
        );
    }

    #[test]
    fn interruptions_keep_attempt_number() {
        let msg = map_event(EngineEvent::StreamInterrupted {
            session_id: SessionId::new("s1"),
            attempt: 3,
            error: StreamError::Closed,
        });
        assert_eq!(
            msg,
            Some(Msg::LogStreamInterrupted {
                session_id: SessionId::new("s1"),
                attempt: 3
            })
        );
    }

    #[test]
    fn process_outcomes_map_to_success_or_failure() {
        let ok = map_event(EngineEvent::ProcessFinished {
            session_id: SessionId::new("s1"),
            result: Ok(JobResult::default()),
        });
        assert!(matches!(ok, Some(Msg::ProcessingSucceeded { .. })));
    }

    #[test]
    fn cleanup_results_are_not_messages() {
        let msg = map_event(EngineEvent::CleanupFinished {
            session_id: SessionId::new("s1"),
            result: Ok(()),
        });
        assert_eq!(msg, None);
    }
}
