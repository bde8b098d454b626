use crate::{JobForm, JobResult, LogEntry, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the upload form. The shell supplies the fresh session
    /// id and the start time label so that `update` stays free of clocks and
    /// randomness.
    SubmitClicked {
        form: JobForm,
        session_id: SessionId,
        started_at: String,
    },
    /// One line arrived on the log stream.
    LogReceived {
        session_id: SessionId,
        entry: LogEntry,
    },
    /// The log stream dropped and the engine is about to reconnect.
    LogStreamInterrupted { session_id: SessionId, attempt: u32 },
    /// The engine stopped reconnecting the log stream.
    LogStreamGaveUp { session_id: SessionId },
    /// The processing request returned a result.
    ProcessingSucceeded {
        session_id: SessionId,
        result: JobResult,
    },
    /// The processing request failed.
    ProcessingFailed {
        session_id: SessionId,
        message: String,
    },
    /// User picked a scene in the results list.
    SceneSelected(usize),
    /// User clicked Back on the failure panel.
    BackClicked,
    /// User asked to start over ("Process another").
    ResetClicked,
}
