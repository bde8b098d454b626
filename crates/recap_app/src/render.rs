//! Terminal rendering of the view model.
//!
//! The renderer is fed every dirty view and prints only what changed since
//! the previous one, so the output reads like a running transcript.

use std::io::{self, Write};

use recap_core::{
    AppViewModel, ClipAvailability, LogLevel, ResultsView, SceneDetailView, View,
    NO_CLIPS_MESSAGE, NO_SCENES_MESSAGE,
};
use url::Url;

const NO_CLIP_FOR_SCENE: &str = "No clip available for this scene.";

pub struct Renderer<W: Write> {
    out: W,
    base_url: Url,
    view: Option<View>,
    alert: Option<String>,
    printed_logs: usize,
    progress: Option<(i64, String)>,
    error: Option<String>,
    scene: Option<SceneDetailView>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, base_url: Url) -> Self {
        Self {
            out,
            base_url,
            view: None,
            alert: None,
            printed_logs: 0,
            progress: None,
            error: None,
            scene: None,
        }
    }

    pub fn render(&mut self, model: &AppViewModel) -> io::Result<()> {
        if model.upload_alert != self.alert {
            if let Some(alert) = &model.upload_alert {
                writeln!(self.out, "! {alert}")?;
            }
            self.alert = model.upload_alert.clone();
        }

        let entered = self.view != Some(model.view);
        self.view = Some(model.view);
        match model.view {
            View::Upload => {
                if entered {
                    self.printed_logs = 0;
                    self.progress = None;
                    self.error = None;
                    self.scene = None;
                }
            }
            View::Processing => self.render_processing(model, entered)?,
            View::Results => {
                if let Some(results) = &model.results {
                    if entered {
                        self.render_results(results)?;
                    }
                    self.render_selected_scene(results)?;
                }
            }
        }
        self.out.flush()
    }

    fn render_processing(&mut self, model: &AppViewModel, entered: bool) -> io::Result<()> {
        let panel = &model.processing;
        if entered {
            writeln!(self.out, "Processing {}", panel.movie_title)?;
            writeln!(self.out, "  Input:   {}", panel.input_name)?;
            writeln!(self.out, "  Started: {}", panel.started_at)?;
            writeln!(self.out, "{}", panel.subtitle)?;
        }

        if model.logs.len() < self.printed_logs {
            self.printed_logs = 0;
        }
        for line in &model.logs[self.printed_logs..] {
            writeln!(self.out, "  {} {}", level_marker(line.level), line.text)?;
        }
        self.printed_logs = model.logs.len();

        let progress = (model.progress_percent.round() as i64, model.progress_text.clone());
        if self.progress.as_ref() != Some(&progress) {
            writeln!(
                self.out,
                "[{:>3}%] {} ({})",
                progress.0, model.progress_text, model.stage
            )?;
            self.progress = Some(progress);
        }

        if panel.error != self.error {
            if let Some(error) = &panel.error {
                writeln!(self.out, "{}", panel.subtitle)?;
                writeln!(self.out, "Error: {error}")?;
            }
            self.error = panel.error.clone();
        }
        Ok(())
    }

    fn render_results(&mut self, results: &ResultsView) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Recap ready: {}", results.movie_title)?;
        writeln!(
            self.out,
            "  Scenes: {}  Clips: {}",
            results.scenes_count, results.clips_count
        )?;
        let downloads = [
            ("Final video", &results.final_video_download),
            ("Script", &results.script_download),
            ("Scenes", &results.scenes_download),
        ];
        for (label, path) in downloads {
            if let Some(path) = path {
                writeln!(self.out, "  {label}: {}", self.absolute(path))?;
            }
        }

        if let Some(notes) = &results.alignment_notes {
            writeln!(self.out)?;
            writeln!(self.out, "Alignment notes:")?;
            writeln!(self.out, "{notes}")?;
        }
        if !results.full_script.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Script:")?;
            writeln!(self.out, "{}", results.full_script)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Scenes:")?;
        if results.scenes.is_empty() {
            writeln!(self.out, "  {NO_SCENES_MESSAGE}")?;
        }
        for row in &results.scenes {
            match &row.narration_preview {
                Some(preview) => writeln!(
                    self.out,
                    "  #{:<3} {}  {}",
                    row.scene_number, row.time_range, preview
                )?,
                None => writeln!(self.out, "  #{:<3} {}", row.scene_number, row.time_range)?,
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "Clips:")?;
        if results.clips.is_empty() {
            writeln!(self.out, "  {NO_CLIPS_MESSAGE}")?;
        }
        for clip in &results.clips {
            match &clip.download {
                Some(path) => writeln!(self.out, "  {}  {}", clip.label, self.absolute(path))?,
                None => writeln!(self.out, "  {}", clip.label)?,
            }
        }
        Ok(())
    }

    fn render_selected_scene(&mut self, results: &ResultsView) -> io::Result<()> {
        if results.selected_scene == self.scene {
            return Ok(());
        }
        self.scene = results.selected_scene.clone();
        let Some(scene) = &results.selected_scene else {
            return Ok(());
        };

        writeln!(self.out)?;
        writeln!(self.out, "{}", scene.meta)?;
        writeln!(self.out, "  {}", scene.title)?;
        writeln!(self.out, "  {}", scene.narration)?;
        match &scene.clip {
            ClipAvailability::Download(path) => {
                writeln!(self.out, "  Clip: {}", self.absolute(path))
            }
            ClipAvailability::NoClip => writeln!(self.out, "  {NO_CLIP_FOR_SCENE}"),
        }
    }

    fn absolute(&self, path: &str) -> String {
        self.base_url
            .join(path)
            .map_or_else(|_| path.to_string(), String::from)
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

fn level_marker(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "·",
        LogLevel::Warning => "!",
        LogLevel::Error => "✗",
        LogLevel::Success => "✓",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::{update, AppState, JobForm, JobResult, LogEntry, Msg, SessionId};

    fn renderer() -> Renderer<Vec<u8>> {
        Renderer::new(Vec::new(), Url::parse("http://recap.local:5001").expect("url"))
    }

    fn step(state: AppState, msg: Msg, renderer: &mut Renderer<Vec<u8>>) -> AppState {
        let (mut state, _effects) = update(state, msg);
        if state.consume_dirty() {
            renderer.render(&state.view()).expect("render");
        }
        state
    }

    fn submit(state: AppState, renderer: &mut Renderer<Vec<u8>>) -> AppState {
        let form = JobForm {
            drive_url: "https://drive.example/v".to_string(),
            script_text: "script".to_string(),
            movie_title: "Hero".to_string(),
            ..JobForm::default()
        };
        step(
            state,
            Msg::SubmitClicked {
                form,
                session_id: SessionId::new("s1"),
                started_at: "2026-01-02 12:03:04".to_string(),
            },
            renderer,
        )
    }

    #[test]
    fn prints_each_log_line_once() {
        let mut renderer = renderer();
        let mut state = submit(AppState::new(), &mut renderer);
        for message in ["Step 2: Downloading video", "Step 3: Splitting video"] {
            state = step(
                state,
                Msg::LogReceived {
                    session_id: SessionId::new("s1"),
                    entry: LogEntry::new(LogLevel::Info, message),
                },
                &mut renderer,
            );
        }

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert_eq!(text.matches("Step 2: Downloading video").count(), 1);
        assert!(text.contains("Processing Hero"));
        assert!(text.contains("Input:   Google Drive link"));
        assert!(text.contains("[ 10%] Acquiring Video..."));
        assert!(text.contains("[ 20%] Splitting Video..."));
    }

    #[test]
    fn results_use_absolute_download_links() {
        let result: JobResult = serde_json::from_str(
            r#"{
                "session_id": "s1",
                "movie_title": "Hero",
                "scenes": [
                    {"scene_number": 1, "start_time": "00:00:00", "end_time": "00:00:10", "narration": "It begins."},
                    {"scene_number": 2, "start_time": "00:00:10", "end_time": "00:00:20"}
                ],
                "clips": [
                    {"scene_number": 1, "clip_path": "out/s1/scene_001.mp4", "start_time": "00:00:00", "end_time": "00:00:10"}
                ],
                "final_video": "out\\s1\\final.mp4"
            }"#,
        )
        .expect("result json");

        let mut renderer = renderer();
        let mut state = submit(AppState::new(), &mut renderer);
        state = step(
            state,
            Msg::ProcessingSucceeded {
                session_id: SessionId::new("s1"),
                result,
            },
            &mut renderer,
        );
        state = step(state, Msg::SceneSelected(0), &mut renderer);
        let _ = step(state, Msg::SceneSelected(1), &mut renderer);

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.contains("Recap ready: Hero"));
        assert!(text.contains("Final video: http://recap.local:5001/api/download/s1/final.mp4"));
        assert!(text.contains("Clip: http://recap.local:5001/api/download/s1/scene_001.mp4"));
        assert!(text.contains(NO_CLIP_FOR_SCENE));
    }

    #[test]
    fn empty_results_show_placeholders() {
        let mut renderer = renderer();
        let state = submit(AppState::new(), &mut renderer);
        let _ = step(
            state,
            Msg::ProcessingSucceeded {
                session_id: SessionId::new("s1"),
                result: JobResult::default(),
            },
            &mut renderer,
        );

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.contains(&format!("Scenes:\n  {NO_SCENES_MESSAGE}\n")));
        assert!(text.contains(&format!("Clips:\n  {NO_CLIPS_MESSAGE}\n")));
    }
}
