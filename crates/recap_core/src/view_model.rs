use crate::links::download_path;
use crate::{JobResult, LogEntry, LogLevel, Phase, Scene, SessionId, View};

/// Narration previews in the scene list are cut to this many characters.
pub const NARRATION_PREVIEW_CHARS: usize = 80;
pub const NO_CLIPS_MESSAGE: &str = "No individual clips were generated.";
pub const NO_SCENES_MESSAGE: &str = "Scenes will appear once processing completes.";
pub const MISSING_NARRATION: &str = "Narration not available for this scene.";
const DEFAULT_SCENES_FILE: &str = "scenes.json";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub view: View,
    pub phase: Phase,
    pub upload_alert: Option<String>,
    pub submit_enabled: bool,
    pub progress_percent: f64,
    pub progress_text: String,
    pub stage: String,
    pub processing: ProcessingPanelView,
    pub logs: Vec<LogLine>,
    pub results: Option<ResultsView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingPanelView {
    pub movie_title: String,
    pub input_name: String,
    pub started_at: String,
    pub subtitle: String,
    pub error: Option<String>,
    pub back_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

impl From<&LogEntry> for LogLine {
    fn from(entry: &LogEntry) -> Self {
        Self {
            level: entry.level,
            text: entry.display_text().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub movie_title: String,
    pub scenes_count: usize,
    pub clips_count: usize,
    pub full_script: String,
    pub alignment_notes: Option<String>,
    pub script_download: Option<String>,
    pub scenes_download: Option<String>,
    pub final_video_download: Option<String>,
    pub scenes: Vec<SceneRowView>,
    pub clips: Vec<ClipLinkView>,
    pub selected_scene: Option<SceneDetailView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRowView {
    pub index: usize,
    pub scene_number: u32,
    pub time_range: String,
    pub narration_preview: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipLinkView {
    pub label: String,
    pub download: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDetailView {
    pub meta: String,
    pub title: String,
    pub narration: String,
    pub clip: ClipAvailability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipAvailability {
    Download(String),
    NoClip,
}

impl ResultsView {
    pub(crate) fn build(
        result: &JobResult,
        session: Option<&SessionId>,
        current_scene: Option<usize>,
    ) -> Self {
        let link = |path: &str| session.and_then(|session| download_path(session, path));

        let scenes = result
            .scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| SceneRowView {
                index,
                scene_number: scene.scene_number,
                time_range: time_range(&scene.start_time, &scene.end_time),
                narration_preview: scene.narration.as_deref().and_then(narration_preview),
                selected: current_scene == Some(index),
            })
            .collect();

        let clips = result
            .clips
            .iter()
            .map(|clip| ClipLinkView {
                label: format!(
                    "Clip {} • {}",
                    clip.scene_number,
                    time_range(&clip.start_time, &clip.end_time)
                ),
                download: link(clip.clip_path.as_str()),
            })
            .collect();

        let selected_scene = current_scene
            .and_then(|index| result.scenes.get(index))
            .map(|scene| scene_detail(result, scene, &link));

        Self {
            movie_title: result
                .movie_title
                .as_deref()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or("—")
                .to_string(),
            scenes_count: result.scenes_count.unwrap_or(result.scenes.len()),
            clips_count: result.clips.len(),
            full_script: result.full_script.clone().unwrap_or_default(),
            alignment_notes: alignment_notes(result),
            script_download: result.script_file.as_deref().and_then(&link),
            scenes_download: link(
                result
                    .scenes_file
                    .as_deref()
                    .filter(|file| !file.is_empty())
                    .unwrap_or(DEFAULT_SCENES_FILE),
            ),
            final_video_download: result.final_video.as_deref().and_then(&link),
            scenes,
            clips,
            selected_scene,
        }
    }
}

fn scene_detail(
    result: &JobResult,
    scene: &Scene,
    link: &dyn Fn(&str) -> Option<String>,
) -> SceneDetailView {
    let duration = match scene.duration_seconds {
        Some(seconds) if seconds != 0.0 => format!(" ({seconds}s)"),
        _ => String::new(),
    };
    let meta = format!(
        "Scene {} • {}{}",
        scene.scene_number,
        time_range(&scene.start_time, &scene.end_time),
        duration
    );

    let title = [scene.title.as_deref(), scene.summary.as_deref()]
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| format!("Scene {}", scene.scene_number));

    let narration = scene
        .narration
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(MISSING_NARRATION)
        .to_string();

    let clip = result
        .clip_for_scene(scene.scene_number)
        .filter(|clip| !clip.clip_path.is_empty())
        .and_then(|clip| link(&clip.clip_path))
        .map_or(ClipAvailability::NoClip, ClipAvailability::Download);

    SceneDetailView {
        meta,
        title,
        narration,
        clip,
    }
}

fn time_range(start: &str, end: &str) -> String {
    format!("{start} → {end}")
}

fn narration_preview(narration: &str) -> Option<String> {
    let trimmed = narration.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut preview: String = trimmed.chars().take(NARRATION_PREVIEW_CHARS).collect();
    if narration.chars().count() > NARRATION_PREVIEW_CHARS {
        preview.push('…');
    }
    Some(preview)
}

fn alignment_notes(result: &JobResult) -> Option<String> {
    if let Some(notes) = result.alignment_notes.as_deref().filter(|n| !n.is_empty()) {
        return Some(notes.to_string());
    }
    if result.skipped_scenes == 0 {
        return None;
    }

    let detail = if !result.skipped_scene_details.is_empty() {
        let parts: Vec<String> = result
            .skipped_scene_details
            .iter()
            .map(|detail| {
                let number = detail
                    .scene_number
                    .map_or_else(|| "Scene".to_string(), |n| format!("Scene {n}"));
                match detail.reason.as_deref().filter(|r| !r.is_empty()) {
                    Some(reason) => format!("{number} – {reason}"),
                    None => number,
                }
            })
            .collect();
        format!(" ({})", parts.join("; "))
    } else {
        let numbers: Vec<String> = result
            .skipped_scene_numbers
            .iter()
            .flatten()
            .filter(|n| **n != 0)
            .map(u32::to_string)
            .collect();
        if numbers.is_empty() {
            String::new()
        } else {
            format!(" ({})", numbers.join(", "))
        }
    };

    Some(format!(
        "Skipped {} segment(s) flagged for manual review{}.",
        result.skipped_scenes, detail
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkippedScene;

    #[test]
    fn preview_truncates_long_narration() {
        let long = "a".repeat(90);
        let preview = narration_preview(&long).expect("preview");
        assert_eq!(preview.chars().count(), NARRATION_PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
        assert_eq!(narration_preview("  short  ").as_deref(), Some("short"));
        assert_eq!(narration_preview("   "), None);
    }

    #[test]
    fn skipped_details_win_over_numbers() {
        let result = JobResult {
            skipped_scenes: 2,
            skipped_scene_numbers: vec![Some(3), Some(7)],
            skipped_scene_details: vec![
                SkippedScene {
                    scene_number: Some(3),
                    reason: Some("no match".to_string()),
                },
                SkippedScene {
                    scene_number: None,
                    reason: None,
                },
            ],
            ..JobResult::default()
        };
        assert_eq!(
            alignment_notes(&result).as_deref(),
            Some("Skipped 2 segment(s) flagged for manual review (Scene 3 – no match; Scene).")
        );

        let numbers_only = JobResult {
            skipped_scene_details: Vec::new(),
            ..result
        };
        assert_eq!(
            alignment_notes(&numbers_only).as_deref(),
            Some("Skipped 2 segment(s) flagged for manual review (3, 7).")
        );
    }

    #[test]
    fn explicit_notes_are_used_verbatim() {
        let result = JobResult {
            alignment_notes: Some("Scenes 4-5 merged.".to_string()),
            skipped_scenes: 1,
            ..JobResult::default()
        };
        assert_eq!(alignment_notes(&result).as_deref(), Some("Scenes 4-5 merged."));
        assert_eq!(alignment_notes(&JobResult::default()), None);
    }
}
