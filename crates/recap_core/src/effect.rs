use crate::{JobPayload, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenLogStream { session_id: SessionId },
    CloseLogStream,
    SubmitJob {
        session_id: SessionId,
        payload: JobPayload,
    },
    /// Best effort; the outcome never comes back as a message.
    CleanupSession { session_id: SessionId },
}
