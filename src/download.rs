use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::api::DownloadBody;
use crate::error::{Result, ClientError};

/// Save a downloaded body as `<dir>/<file_name>`.
///
/// The body is streamed into a temporary file in `dir` and then persisted
/// under its final name, so a failed transfer never leaves a partial file
/// behind the fixed name. The temporary handle is released before returning.
pub async fn save_download(dir: &Path, file_name: &str, body: DownloadBody) -> Result<PathBuf> {
    if file_name.is_empty() || Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
        return Err(ClientError::Config(format!("Invalid download file name: {:?}", file_name)));
    }

    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(file_name);

    let temp = tempfile::Builder::new()
        .prefix(".subweave-")
        .suffix(".part")
        .tempfile_in(dir)?;
    debug!("Writing download to {}", temp.path().display());

    let mut file = tokio::fs::File::from_std(temp.reopen()?);
    let size = body.write_to(&mut file).await?;
    drop(file);

    temp.persist(&target).map_err(|e| e.error)?;

    info!("Saved {} bytes to {}", size, target.display());
    Ok(target)
}

/// File name for the source subtitles of a server-side video path
pub fn source_subtitles_name(video_path: &str) -> String {
    let stem = Path::new(video_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "subtitles".to_string());

    format!("{}.vtt", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_save_download_writes_fixed_name() {
        let temp = TempDir::new().unwrap();

        let path = assert_ok!(save_download(temp.path(), "translated_subtitles.vtt", b"WEBVTT\n".to_vec().into()).await);

        assert_eq!(path, temp.path().join("translated_subtitles.vtt"));
        temp.child("translated_subtitles.vtt").assert("WEBVTT\n");

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_save_download_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        temp.child("video_with_subtitles.mp4").write_str("old").unwrap();

        save_download(temp.path(), "video_with_subtitles.mp4", b"new".to_vec().into())
            .await
            .unwrap();

        temp.child("video_with_subtitles.mp4").assert("new");
    }

    #[tokio::test]
    async fn test_save_download_creates_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("out").join("today");

        save_download(&nested, "a.vtt", Vec::<u8>::new().into()).await.unwrap();

        assert!(nested.join("a.vtt").exists());
    }

    #[tokio::test]
    async fn test_save_download_rejects_paths() {
        let temp = TempDir::new().unwrap();

        let err = assert_err!(save_download(temp.path(), "../escape.vtt", b"x".to_vec().into()).await);
        assert!(matches!(err, ClientError::Config(_)));
        assert_err!(save_download(temp.path(), "", b"x".to_vec().into()).await);
    }

    #[test]
    fn test_source_subtitles_name() {
        assert_eq!(source_subtitles_name("talk.mp4"), "talk.vtt");
        assert_eq!(source_subtitles_name("nested/dir/clip.final.mkv"), "clip.final.vtt");
        assert_eq!(source_subtitles_name(""), "subtitles.vtt");
    }
}
