use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use recap_core::{update, AppState, JobForm, Msg, Phase, SessionId};
use recap_engine::EngineEvent;
use recap_logging::{recap_debug, recap_error, recap_info, recap_warn};

use crate::effects::{map_event, Backend};
use crate::render::Renderer;
use crate::session;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CLEANUP_WAIT: Duration = Duration::from_secs(20);
const ENGINE_STOPPED_MESSAGE: &str = "Lost contact with the background worker.";

/// How a run ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Rejected,
}

pub struct App<W: Write, B: Backend> {
    state: AppState,
    backend: B,
    renderer: Renderer<W>,
}

impl<W: Write, B: Backend> App<W, B> {
    pub fn new(backend: B, renderer: Renderer<W>) -> Self {
        Self {
            state: AppState::new(),
            backend,
            renderer,
        }
    }

    /// Submits `form` and drives the job to completion or failure.
    pub fn run(&mut self, form: JobForm, cleanup: bool) -> Result<Outcome> {
        let (session_id, started_at) = session::new_session();
        self.dispatch(Msg::SubmitClicked {
            form,
            session_id: session_id.clone(),
            started_at,
        })?;
        if self.state.phase() == Phase::Idle {
            return Ok(Outcome::Rejected);
        }

        while matches!(self.state.phase(), Phase::Submitting | Phase::Streaming) {
            let event = match self.backend.next_event(POLL_INTERVAL) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    recap_error!(session: session_id; "{}", err);
                    self.dispatch(Msg::ProcessingFailed {
                        session_id: session_id.clone(),
                        message: ENGINE_STOPPED_MESSAGE.to_string(),
                    })?;
                    break;
                }
            };
            if let EngineEvent::CleanupFinished { session_id, .. } = &event {
                recap_debug!(session: session_id; "ignoring cleanup result while job runs");
                continue;
            }
            if let Some(msg) = map_event(event) {
                self.dispatch(msg)?;
            }
        }

        let outcome = match self.state.phase() {
            Phase::Completed => {
                let scenes = self.state.result().map_or(0, |result| result.scenes.len());
                for index in 0..scenes {
                    self.dispatch(Msg::SceneSelected(index))?;
                }
                recap_info!(session: session_id; "job completed with {} scenes", scenes);
                Outcome::Completed
            }
            _ => {
                self.dispatch(Msg::BackClicked)?;
                recap_warn!(session: session_id; "job failed");
                Outcome::Failed
            }
        };

        if cleanup {
            self.dispatch(Msg::ResetClicked)?;
            self.await_cleanup(&session_id);
        }
        Ok(outcome)
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer.render(&state.view())?;
        }
        self.state = state;
        self.backend.execute(effects);
        Ok(())
    }

    fn await_cleanup(&self, session_id: &SessionId) {
        let deadline = Instant::now() + CLEANUP_WAIT;
        while Instant::now() < deadline {
            match self.backend.next_event(POLL_INTERVAL) {
                Ok(Some(EngineEvent::CleanupFinished {
                    session_id: finished,
                    result,
                })) if &finished == session_id => {
                    match result {
                        Ok(()) => recap_info!(session: finished; "cleanup finished"),
                        Err(err) => recap_warn!(session: finished; "cleanup failed: {}", err),
                    }
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    recap_warn!(session: session_id; "no cleanup result: {}", err);
                    return;
                }
            }
        }
        recap_warn!(session: session_id; "no cleanup result within {:?}", CLEANUP_WAIT);
    }

    #[cfg(test)]
    fn into_parts(self) -> (B, W) {
        (self.backend, self.renderer.into_inner())
    }
}
