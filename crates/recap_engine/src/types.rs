use std::io;

use recap_core::{JobResult, LogEntry, SessionId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    LogLine {
        session_id: SessionId,
        entry: LogEntry,
    },
    StreamInterrupted {
        session_id: SessionId,
        attempt: u32,
        error: StreamError,
    },
    StreamGaveUp {
        session_id: SessionId,
    },
    ProcessFinished {
        session_id: SessionId,
        result: Result<JobResult, RequestError>,
    },
    CleanupFinished {
        session_id: SessionId,
        result: Result<(), CleanupError>,
    },
}

/// Failure of the processing request. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    /// The server answered 2xx with a body that is not a job result.
    Decode,
    /// The video file to upload could not be read.
    LocalFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("could not connect to log stream: {0}")]
    Connect(String),
    #[error("log stream returned http status {0}")]
    HttpStatus(u16),
    #[error("log stream read failed: {0}")]
    Read(String),
    #[error("log stream closed by server")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    #[error("cleanup returned http status {0}")]
    HttpStatus(u16),
    #[error("cleanup request failed: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("engine runtime failed to start: {0}")]
    Runtime(#[from] io::Error),
    #[error("engine worker stopped")]
    Disconnected,
}
