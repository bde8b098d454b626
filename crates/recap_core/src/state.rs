use crate::progress::ProgressState;
use crate::view_model::{AppViewModel, LogLine, ProcessingPanelView, ResultsView};
use crate::{JobResult, LogEntry, LogLevel, SessionId};

pub(crate) const PREPARING_SUBTITLE: &str =
    "We're preparing your video. Hang tight, logs update in real time.";
pub(crate) const FAILED_SUBTITLE: &str = "Something went wrong. Review the log and try again.";
pub(crate) const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed. Please try again.";
pub(crate) const STREAM_INTERRUPTED_LINE: &str =
    "[Log Stream] Connection interrupted. Attempting to reconnect…";
pub(crate) const STREAM_GAVE_UP_LINE: &str =
    "[Log Stream] Connection lost. Live logs are unavailable for this job.";

/// Lifecycle of the single job the tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Request in flight without a live log stream.
    Submitting,
    /// Request in flight and the log stream is open.
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Upload,
    Processing,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub session_id: SessionId,
    pub video_source_label: String,
    pub movie_title: String,
    pub started_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    phase: Phase,
    view: View,
    job: Option<Job>,
    stream_open: bool,
    submit_enabled: bool,
    upload_alert: Option<String>,
    progress: ProgressState,
    subtitle: String,
    processing_error: Option<String>,
    logs: Vec<LogLine>,
    result: Option<JobResult>,
    current_scene: Option<usize>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            view: View::Upload,
            job: None,
            stream_open: false,
            submit_enabled: true,
            upload_alert: None,
            progress: ProgressState::waiting(),
            subtitle: PREPARING_SUBTITLE.to_string(),
            processing_error: None,
            logs: Vec::new(),
            result: None,
            current_scene: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let processing = ProcessingPanelView {
            movie_title: self
                .job
                .as_ref()
                .map(|job| placeholder_if_empty(&job.movie_title))
                .unwrap_or_else(|| placeholder_if_empty("")),
            input_name: self
                .job
                .as_ref()
                .map(|job| placeholder_if_empty(&job.video_source_label))
                .unwrap_or_else(|| placeholder_if_empty("")),
            started_at: self
                .job
                .as_ref()
                .map(|job| placeholder_if_empty(&job.started_at))
                .unwrap_or_else(|| placeholder_if_empty("")),
            subtitle: self.subtitle.clone(),
            error: self.processing_error.clone(),
            back_visible: self.phase == Phase::Failed,
        };

        let results = self.result.as_ref().map(|result| {
            let session = result
                .session_id
                .as_ref()
                .or_else(|| self.job.as_ref().map(|job| &job.session_id));
            ResultsView::build(result, session, self.current_scene)
        });

        AppViewModel {
            view: self.view,
            phase: self.phase,
            upload_alert: self.upload_alert.clone(),
            submit_enabled: self.submit_enabled,
            progress_percent: self.progress.clamped_percent(),
            progress_text: self.progress.text.clone(),
            stage: self.progress.stage.clone(),
            processing,
            logs: self.logs.clone(),
            results,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True when `session_id` names the job whose log stream is open.
    pub(crate) fn owns_stream(&self, session_id: &SessionId) -> bool {
        self.stream_open && self.is_active_session(session_id)
    }

    /// True when `session_id` names the job whose request is still in flight.
    pub(crate) fn awaits_result(&self, session_id: &SessionId) -> bool {
        matches!(self.phase, Phase::Streaming | Phase::Submitting)
            && self.is_active_session(session_id)
    }

    fn is_active_session(&self, session_id: &SessionId) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| &job.session_id == session_id)
    }

    /// Marks the stream closed. Returns whether it was open, i.e. whether a
    /// close effect is owed to the engine.
    pub(crate) fn close_stream(&mut self) -> bool {
        let was_open = std::mem::take(&mut self.stream_open);
        if was_open && self.phase == Phase::Streaming {
            self.phase = Phase::Submitting;
        }
        was_open
    }

    pub(crate) fn clear_upload_alert(&mut self) {
        if self.upload_alert.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn show_upload_alert(&mut self, message: String) {
        self.upload_alert = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn start_job(&mut self, job: Job) {
        self.reset_processing_view();
        self.result = None;
        self.current_scene = None;
        self.job = Some(job);
        self.submit_enabled = false;
        self.progress = ProgressState::new(5.0, "Generating recap script…", "Generating recap script");
        self.view = View::Processing;
        self.phase = Phase::Submitting;
        self.mark_dirty();
    }

    pub(crate) fn open_stream(&mut self) {
        self.stream_open = true;
        self.phase = Phase::Streaming;
        self.mark_dirty();
    }

    pub(crate) fn append_log(&mut self, entry: &LogEntry) {
        self.logs.push(LogLine::from(entry));
        self.mark_dirty();
    }

    pub(crate) fn append_line(&mut self, level: LogLevel, text: impl Into<String>) {
        self.logs.push(LogLine {
            level,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn set_progress(&mut self, progress: ProgressState) {
        self.progress = progress;
        self.mark_dirty();
    }

    pub(crate) fn complete(&mut self, result: JobResult) {
        self.current_scene = (!result.scenes.is_empty()).then_some(0);
        self.result = Some(result);
        self.progress = ProgressState::new(100.0, "Processing complete!", "Complete");
        self.view = View::Results;
        self.phase = Phase::Completed;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, message: String) {
        let message = if message.trim().is_empty() {
            DEFAULT_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        self.submit_enabled = true;
        self.progress = ProgressState::new(0.0, "Error encountered", "Error encountered");
        self.append_line(LogLevel::Error, format!("[Client] {message}"));
        self.subtitle = FAILED_SUBTITLE.to_string();
        self.processing_error = Some(message);
        self.phase = Phase::Failed;
        self.mark_dirty();
    }

    pub(crate) fn select_scene(&mut self, index: usize) -> bool {
        let in_range = self
            .result
            .as_ref()
            .is_some_and(|result| index < result.scenes.len());
        if in_range {
            self.current_scene = Some(index);
            self.mark_dirty();
        }
        in_range
    }

    /// Leaves the failure panel for the upload form, carrying the error over
    /// as the upload banner. The job is kept so a later reset can still clean
    /// up its files on the server.
    pub(crate) fn back_to_upload(&mut self) {
        let message = self.processing_error.take();
        self.reset_processing_view();
        self.view = View::Upload;
        self.phase = Phase::Idle;
        if let Some(message) = message {
            self.show_upload_alert(message);
        }
        self.mark_dirty();
    }

    /// Drops the job, its result and every piece of view state.
    pub(crate) fn clear(&mut self) {
        *self = Self {
            dirty: true,
            ..Self::default()
        };
    }

    fn reset_processing_view(&mut self) {
        self.stream_open = false;
        self.progress = ProgressState::waiting();
        self.logs.clear();
        self.processing_error = None;
        self.subtitle = PREPARING_SUBTITLE.to_string();
    }
}

fn placeholder_if_empty(value: &str) -> String {
    if value.trim().is_empty() {
        "—".to_string()
    } else {
        value.to_string()
    }
}
