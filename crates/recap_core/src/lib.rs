//! Recap core: pure job-tracking state machine and view-model helpers.
mod effect;
mod form;
mod links;
mod msg;
mod progress;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{JobForm, JobPayload, ValidationError, VideoSource, DRIVE_SOURCE_LABEL};
pub use links::download_path;
pub use msg::Msg;
pub use progress::{progress_for_entry, ProgressState};
pub use state::{AppState, Job, Phase, View};
pub use types::{Clip, JobResult, LogEntry, LogLevel, Scene, SessionId, SkippedScene};
pub use update::update;
pub use view_model::{
    AppViewModel, ClipAvailability, ClipLinkView, LogLine, ProcessingPanelView, ResultsView,
    SceneDetailView, SceneRowView, MISSING_NARRATION, NARRATION_PREVIEW_CHARS, NO_CLIPS_MESSAGE,
    NO_SCENES_MESSAGE,
};
