use std::path::PathBuf;

use thiserror::Error;

/// Label shown for the input when the video comes from a Drive link.
pub const DRIVE_SOURCE_LABEL: &str = "Google Drive link";

/// Raw upload form as the user filled it in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobForm {
    pub video_file: Option<PathBuf>,
    pub drive_url: String,
    pub script_text: String,
    pub instructions: String,
    pub movie_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    File(PathBuf),
    DriveUrl(String),
}

impl VideoSource {
    /// Name shown in the processing panel for this input.
    pub fn label(&self) -> String {
        match self {
            VideoSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            VideoSource::DriveUrl(_) => DRIVE_SOURCE_LABEL.to_string(),
        }
    }
}

/// Validated form contents, ready to be sent to the processing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPayload {
    pub source: VideoSource,
    pub script_text: String,
    pub instructions: Option<String>,
    pub movie_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a video or provide a Google Drive link.")]
    MissingSource,
    #[error("Choose only one input method: either upload a file or provide a Google Drive link.")]
    ConflictingSources,
    #[error("Please paste the script text.")]
    MissingScript,
}

impl JobForm {
    /// Check the form and trim its text fields.
    ///
    /// The source is checked before the script, so a form missing both
    /// reports the missing source.
    pub fn validate(&self) -> Result<JobPayload, ValidationError> {
        let drive_url = self.drive_url.trim();
        let source = match (&self.video_file, drive_url.is_empty()) {
            (None, true) => return Err(ValidationError::MissingSource),
            (Some(_), false) => return Err(ValidationError::ConflictingSources),
            (Some(path), true) => VideoSource::File(path.clone()),
            (None, false) => VideoSource::DriveUrl(drive_url.to_string()),
        };

        let script_text = self.script_text.trim();
        if script_text.is_empty() {
            return Err(ValidationError::MissingScript);
        }

        let instructions = self.instructions.trim();
        Ok(JobPayload {
            source,
            script_text: script_text.to_string(),
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            movie_title: self.movie_title.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_drive_url_counts_as_missing() {
        let form = JobForm {
            drive_url: "   ".to_string(),
            script_text: "x".to_string(),
            ..JobForm::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingSource));
    }

    #[test]
    fn fields_are_trimmed() {
        let form = JobForm {
            drive_url: " https://drive.google.com/file/d/abc/view ".to_string(),
            script_text: "\n the recap \n".to_string(),
            instructions: "  ".to_string(),
            movie_title: " Heat ".to_string(),
            ..JobForm::default()
        };
        let payload = form.validate().expect("valid form");
        assert_eq!(
            payload.source,
            VideoSource::DriveUrl("https://drive.google.com/file/d/abc/view".to_string())
        );
        assert_eq!(payload.script_text, "the recap");
        assert_eq!(payload.instructions, None);
        assert_eq!(payload.movie_title, "Heat");
    }

    #[test]
    fn file_label_is_the_file_name() {
        let source = VideoSource::File(PathBuf::from("/tmp/videos/heat.mp4"));
        assert_eq!(source.label(), "heat.mp4");
        assert_eq!(
            VideoSource::DriveUrl("u".to_string()).label(),
            DRIVE_SOURCE_LABEL
        );
    }
}
