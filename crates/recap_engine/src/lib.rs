//! Recap engine: backend IO and effect execution.
mod api;
mod engine;
mod retry;
mod sink;
mod sse;
mod stream;
mod types;

pub use api::{ClientSettings, RecapApi, ReqwestRecapApi, DEFAULT_SERVER_URL};
pub use engine::EngineHandle;
pub use retry::ReconnectPolicy;
pub use sink::{ChannelEventSink, EventSink};
pub use sse::SseDecoder;
pub use stream::LogStreamer;
pub use types::{
    CleanupError, EngineError, EngineEvent, FailureKind, RequestError, StreamError,
};
