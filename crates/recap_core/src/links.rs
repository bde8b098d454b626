use url::Url;

use crate::SessionId;

/// Server-relative download path for a file produced by a job.
///
/// The backend reports files either as bare names or as full server paths
/// (with either separator); only the last segment is used. Both segments are
/// percent-encoded.
pub fn download_path(session_id: &SessionId, file_path: &str) -> Option<String> {
    let filename = file_path.rsplit(['/', '\\']).next().unwrap_or_default();
    if session_id.as_str().is_empty() || filename.is_empty() {
        return None;
    }

    let mut url = Url::parse("http://localhost/").ok()?;
    url.path_segments_mut()
        .ok()?
        .clear()
        .extend(["api", "download", session_id.as_str(), filename]);
    Some(url.path().to_string())
}
