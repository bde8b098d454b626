use std::sync::OnceLock;

use regex::Regex;

use crate::LogEntry;

/// Percent range covered by the per-chunk analysis lines.
const CHUNK_RANGE_START: f64 = 20.0;
const CHUNK_RANGE_SPAN: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub percent: f64,
    pub text: String,
    pub stage: String,
}

impl ProgressState {
    pub fn new(percent: f64, text: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            percent,
            text: text.into(),
            stage: stage.into(),
        }
    }

    pub(crate) fn waiting() -> Self {
        Self::new(0.0, "Waiting to start…", "Initializing...")
    }

    /// Percent clamped to the displayable range.
    pub fn clamped_percent(&self) -> f64 {
        self.percent.clamp(0.0, 100.0)
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::waiting()
    }
}

/// Substrings to look for, then percent, progress text and stage label.
type Milestone = (&'static [&'static str], f64, &'static str, &'static str);

/// Milestones checked before the chunk lines, matched by substring in order.
const MILESTONES: &[Milestone] = &[
    (
        &[
            "Step 2: Downloading video",
            "Step 2: Saving uploaded video",
        ],
        10.0,
        "Acquiring Video...",
        "Acquiring Video",
    ),
    (
        &["Step 3: Splitting video"],
        20.0,
        "Splitting Video...",
        "Splitting Video",
    ),
];

const LATE_MILESTONES: &[Milestone] = &[
    (
        &["Step 4: Generating narration audio"],
        75.0,
        "Generating Narration...",
        "Generating Audio",
    ),
    (
        &["Step 5: Processing video clips"],
        85.0,
        "Cutting Video Clips...",
        "Processing Clips",
    ),
    (
        &["Step 6: Creating final concatenated video"],
        95.0,
        "Rendering Final Video...",
        "Finalizing",
    ),
    (
        &["VIDEO PROCESSING COMPLETED SUCCESSFULLY"],
        100.0,
        "Processing Complete!",
        "Complete",
    ),
];

/// Derive a progress update from one log entry.
///
/// Entries that carry `stage` and `percent` are taken as-is. Everything else
/// goes through the wording heuristics, which only know the backend's current
/// phrasing: a reworded milestone yields `None` and the bar simply stops
/// moving.
pub fn progress_for_entry(entry: &LogEntry) -> Option<ProgressState> {
    if let (Some(stage), Some(percent)) = (entry.stage.as_deref(), entry.percent) {
        if percent.is_finite() {
            return Some(ProgressState::new(percent, format!("{stage}..."), stage));
        }
    }

    let message = if entry.message.is_empty() {
        entry.formatted.as_deref().unwrap_or_default()
    } else {
        entry.message.as_str()
    };
    if message.is_empty() {
        return None;
    }

    if let Some(update) = match_milestone(MILESTONES, message) {
        return Some(update);
    }
    if message.contains("Processing Chunk") {
        // A chunk line that does not parse stops the search, like any other
        // recognized-but-unusable line.
        return chunk_progress(message);
    }
    match_milestone(LATE_MILESTONES, message)
}

fn match_milestone(table: &[Milestone], message: &str) -> Option<ProgressState> {
    table
        .iter()
        .find(|(needles, ..)| needles.iter().any(|needle| message.contains(needle)))
        .map(|(_, percent, text, stage)| ProgressState::new(*percent, *text, *stage))
}

fn chunk_progress(message: &str) -> Option<ProgressState> {
    static CHUNK_RE: OnceLock<Regex> = OnceLock::new();
    let re = CHUNK_RE.get_or_init(|| {
        Regex::new(r"Processing Chunk (\d+)/(\d+)").expect("valid chunk regex")
    });
    let captures = re.captures(message)?;
    let current: u32 = captures[1].parse().ok()?;
    let total: u32 = captures[2].parse().ok()?;
    if total == 0 {
        return None;
    }
    let percent = CHUNK_RANGE_START + f64::from(current) * CHUNK_RANGE_SPAN / f64::from(total);
    Some(ProgressState::new(
        percent,
        format!("Analyzing Chunk {current}/{total}..."),
        format!("Analyzing Chunk {current}/{total}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;

    fn info(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, message)
    }

    #[test]
    fn chunk_line_interpolates_between_anchors() {
        let update = progress_for_entry(&info("--- Processing Chunk 3/10: chunk_003.mp4 ---"))
            .expect("chunk progress");
        assert!((update.percent - 35.0).abs() < 1e-9);
        assert_eq!(update.stage, "Analyzing Chunk 3/10");
        assert_eq!(update.text, "Analyzing Chunk 3/10...");
    }

    #[test]
    fn zero_chunk_total_is_ignored() {
        assert_eq!(progress_for_entry(&info("Processing Chunk 1/0")), None);
    }

    #[test]
    fn formatted_is_used_when_message_is_empty() {
        let entry = LogEntry {
            formatted: Some("12:00 - INFO - Step 3: Splitting video into chunks".to_string()),
            ..LogEntry::default()
        };
        let update = progress_for_entry(&entry).expect("milestone");
        assert_eq!(update.stage, "Splitting Video");
    }

    #[test]
    fn structured_fields_bypass_wording() {
        let entry = LogEntry {
            message: "something the heuristics do not know".to_string(),
            stage: Some("Uploading".to_string()),
            percent: Some(42.0),
            ..LogEntry::default()
        };
        let update = progress_for_entry(&entry).expect("structured");
        assert_eq!(update, ProgressState::new(42.0, "Uploading...", "Uploading"));
    }

    #[test]
    fn clamped_percent_stays_in_range() {
        assert_eq!(ProgressState::new(140.0, "", "").clamped_percent(), 100.0);
        assert_eq!(ProgressState::new(-3.0, "", "").clamped_percent(), 0.0);
    }
}
