use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub message: String,
    pub video_path: String,
    /// Name of the subtitle track the server generated for the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub video_file_path: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateResult {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoneStatus {
    pub message: String,
}

/// Error payload the server attaches to non-success responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// One progress reading, 0 to 100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub progress: u8,
}

impl ProgressSnapshot {
    pub const COMPLETE: u8 = 100;

    pub fn new(progress: u8) -> Self {
        Self { progress: progress.min(Self::COMPLETE) }
    }

    /// Read `progress` from a response body. A missing or non-numeric field reads as 0.
    pub fn from_value(body: &Value) -> Self {
        let progress = body
            .get("progress")
            .and_then(Value::as_f64)
            .map(|p| p.clamp(0.0, Self::COMPLETE as f64) as u8)
            .unwrap_or(0);

        Self { progress }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= Self::COMPLETE
    }
}

/// Locations the media preview points at for an uploaded video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPreview {
    pub video_src: Url,
    pub subtitles_src: Url,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_progress_from_value() {
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": 55})).progress, 55);
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": 42.9})).progress, 42);
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": 250})).progress, 100);
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": -3})).progress, 0);
    }

    #[test]
    fn test_progress_defaults_to_zero() {
        assert_eq!(ProgressSnapshot::from_value(&json!({})).progress, 0);
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": null})).progress, 0);
        assert_eq!(ProgressSnapshot::from_value(&json!({"progress": "fifty"})).progress, 0);
        assert_eq!(ProgressSnapshot::from_value(&json!([1, 2])).progress, 0);
    }

    #[test]
    fn test_upload_result_accepts_subtitle_path() {
        let body = r#"{"message":"File uploaded successfully","video_path":"talk.mp4","subtitle_path":"talk.vtt"}"#;
        let parsed: UploadResult = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.video_path, "talk.mp4");
        assert_eq!(parsed.subtitle_path.as_deref(), Some("talk.vtt"));

        let minimal: UploadResult = serde_json::from_str(r#"{"message":"ok","video_path":"v.mp4"}"#).unwrap();
        assert_eq!(minimal.subtitle_path, None);
    }

    #[test]
    fn test_error_body_is_optional() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"No file received"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("No file received"));

        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.error.is_none());
    }
}
