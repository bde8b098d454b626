use std::fmt;

use serde::Deserialize;

/// Identifier the backend uses to group one job's files and log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WARNING" | "WARN" => LogLevel::Warning,
            "ERROR" | "CRITICAL" | "FATAL" => LogLevel::Error,
            "SUCCESS" => LogLevel::Success,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        };
        f.write_str(label)
    }
}

/// One line pushed by the backend over the log stream.
///
/// `stage` and `percent` are only present when the backend reports progress
/// explicitly; older backends leave them out and progress is inferred from
/// `message`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub formatted: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub percent: Option<f64>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Text shown in the log panel: the pre-rendered line if the backend sent
    /// one, otherwise the bare message.
    pub fn display_text(&self) -> &str {
        match self.formatted.as_deref() {
            Some(formatted) if !formatted.is_empty() => formatted,
            _ => &self.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Clip {
    pub scene_number: u32,
    #[serde(default)]
    pub clip_path: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkippedScene {
    #[serde(default)]
    pub scene_number: Option<u32>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Successful response body of the processing request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub movie_title: Option<String>,
    #[serde(default)]
    pub scenes_count: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub final_video: Option<String>,
    #[serde(default)]
    pub full_script: Option<String>,
    #[serde(default)]
    pub script_file: Option<String>,
    #[serde(default)]
    pub scenes_file: Option<String>,
    #[serde(default)]
    pub alignment_notes: Option<String>,
    #[serde(default)]
    pub skipped_scenes: usize,
    #[serde(default)]
    pub skipped_scene_numbers: Vec<Option<u32>>,
    #[serde(default)]
    pub skipped_scene_details: Vec<SkippedScene>,
}

impl JobResult {
    pub fn clip_for_scene(&self, scene_number: u32) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|clip| clip.scene_number == scene_number)
    }
}
