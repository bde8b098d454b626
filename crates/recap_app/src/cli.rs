use std::fs;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use recap_core::JobForm;

use crate::logging::LogDestination;

/// Submit a video recap job and follow it until it finishes.
#[derive(Debug, Parser)]
#[command(name = "recap", version)]
pub struct Cli {
    /// Config file (defaults to ./recap.ron when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Backend base URL, overriding the config file.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
    /// Log file, overriding the config file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// More log detail; repeat for trace output.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Local video to upload.
    #[arg(long, value_name = "PATH")]
    pub video: Option<PathBuf>,
    /// Google Drive link the backend downloads the video from.
    #[arg(long, value_name = "URL")]
    pub drive_url: Option<String>,
    /// File holding the movie script.
    #[arg(long, value_name = "FILE", conflicts_with = "script_text")]
    pub script: Option<PathBuf>,
    /// Movie script given inline.
    #[arg(long, value_name = "TEXT")]
    pub script_text: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,
    /// Extra guidance for the recap writer.
    #[arg(long, value_name = "TEXT")]
    pub instructions: Option<String>,
    /// Ask the backend to delete the job's files once done.
    #[arg(long)]
    pub cleanup: bool,
}

impl Cli {
    /// Fills the upload form. Source and script are checked later, when the
    /// form is submitted.
    pub fn job_form(&self) -> io::Result<JobForm> {
        let script_text = match &self.script {
            Some(path) => fs::read_to_string(path)?,
            None => self.script_text.clone().unwrap_or_default(),
        };
        Ok(JobForm {
            video_file: self.video.clone(),
            drive_url: self.drive_url.clone().unwrap_or_default(),
            script_text,
            instructions: self.instructions.clone().unwrap_or_default(),
            movie_title: self.title.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ffi::OsString;

    #[test]
    fn parses_drive_job_with_inline_script() {
        let cli = Cli::try_parse_from([
            "recap",
            "--drive-url",
            "https://drive.google.com/file/d/abc/view",
            "--script-text",
            "A hero rises.",
            "--title",
            "Hero",
            "-vv",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log, LogDestination::File);

        let form = cli.job_form().expect("form");
        assert_eq!(form.video_file, None);
        assert_eq!(form.drive_url, "https://drive.google.com/file/d/abc/view");
        assert_eq!(form.script_text, "A hero rises.");
        assert_eq!(form.movie_title, "Hero");
        assert_eq!(form.instructions, "");
    }

    #[test]
    fn reads_script_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("script.txt");
        fs::write(&script, "INT. HOUSE - NIGHT").expect("write script");

        let args: Vec<OsString> = vec![
            "recap".into(),
            "--video".into(),
            dir.path().join("movie.mp4").into(),
            "--script".into(),
            script.clone().into(),
            "--log".into(),
            "both".into(),
        ];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.log, LogDestination::Both);
        assert_eq!(cli.job_form().expect("form").script_text, "INT. HOUSE - NIGHT");
    }

    #[test]
    fn both_sources_are_left_for_form_validation() {
        let cli = Cli::try_parse_from([
            "recap",
            "--video",
            "movie.mp4",
            "--drive-url",
            "https://drive.example/v",
        ])
        .expect("parse");
        let form = cli.job_form().expect("form");
        assert!(form.video_file.is_some());
        assert!(!form.drive_url.is_empty());
    }

    #[test]
    fn script_file_and_text_conflict() {
        assert!(Cli::try_parse_from(["recap", "--script", "a.txt", "--script-text", "b"]).is_err());
    }
}
