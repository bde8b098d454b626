use recap_logging::recap_debug;

use crate::progress::progress_for_entry;
use crate::state::{STREAM_GAVE_UP_LINE, STREAM_INTERRUPTED_LINE};
use crate::{AppState, Effect, Job, LogLevel, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Whenever a transition closes the log stream, `Effect::CloseLogStream` is
/// the first effect returned, so the shell tears the old stream down before
/// acting on anything else.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitClicked {
            form,
            session_id,
            started_at,
        } => {
            if !matches!(state.phase(), Phase::Idle | Phase::Failed) {
                return (state, Vec::new());
            }
            state.clear_upload_alert();
            match form.validate() {
                Err(err) => {
                    state.show_upload_alert(err.to_string());
                    Vec::new()
                }
                Ok(payload) => {
                    let mut effects = Vec::with_capacity(3);
                    if state.close_stream() {
                        effects.push(Effect::CloseLogStream);
                    }
                    state.start_job(Job {
                        session_id: session_id.clone(),
                        video_source_label: payload.source.label(),
                        movie_title: payload.movie_title.clone(),
                        started_at,
                    });
                    state.open_stream();
                    effects.push(Effect::OpenLogStream {
                        session_id: session_id.clone(),
                    });
                    effects.push(Effect::SubmitJob {
                        session_id,
                        payload,
                    });
                    effects
                }
            }
        }
        Msg::LogReceived { session_id, entry } => {
            if !state.owns_stream(&session_id) {
                recap_debug!(session: session_id; "dropping log line for inactive stream");
                return (state, Vec::new());
            }
            state.append_log(&entry);
            if let Some(progress) = progress_for_entry(&entry) {
                state.set_progress(progress);
            }
            Vec::new()
        }
        Msg::LogStreamInterrupted {
            session_id,
            attempt,
        } => {
            if !state.owns_stream(&session_id) {
                return (state, Vec::new());
            }
            recap_debug!(session: session_id; "log stream interrupted (attempt {})", attempt);
            state.append_line(LogLevel::Warning, STREAM_INTERRUPTED_LINE);
            Vec::new()
        }
        Msg::LogStreamGaveUp { session_id } => {
            if !state.owns_stream(&session_id) {
                return (state, Vec::new());
            }
            state.close_stream();
            state.append_line(LogLevel::Warning, STREAM_GAVE_UP_LINE);
            vec![Effect::CloseLogStream]
        }
        Msg::ProcessingSucceeded { session_id, result } => {
            if !state.awaits_result(&session_id) {
                recap_debug!(session: session_id; "ignoring result for inactive job");
                return (state, Vec::new());
            }
            let mut effects = Vec::new();
            if state.close_stream() {
                effects.push(Effect::CloseLogStream);
            }
            state.complete(result);
            effects
        }
        Msg::ProcessingFailed {
            session_id,
            message,
        } => {
            if !state.awaits_result(&session_id) {
                recap_debug!(session: session_id; "ignoring failure for inactive job");
                return (state, Vec::new());
            }
            let mut effects = Vec::new();
            if state.close_stream() {
                effects.push(Effect::CloseLogStream);
            }
            state.fail(message);
            effects
        }
        Msg::SceneSelected(index) => {
            state.select_scene(index);
            Vec::new()
        }
        Msg::BackClicked => {
            if state.phase() == Phase::Failed {
                state.back_to_upload();
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            let mut effects = Vec::with_capacity(2);
            if state.close_stream() {
                effects.push(Effect::CloseLogStream);
            }
            if let Some(job) = state.job() {
                effects.push(Effect::CleanupSession {
                    session_id: job.session_id.clone(),
                });
            }
            state.clear();
            effects
        }
    };

    (state, effects)
}
