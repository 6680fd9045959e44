use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::{Result, ClientError};
use super::MediaPreview;

pub const UPLOAD: &str = "upload";
pub const GET_VIDEO: &str = "get_video";
pub const GET_SUBTITLES: &str = "get_subtitles";
pub const TRANSLATE: &str = "translate";
pub const PROGRESS: &str = "progress";
pub const DONE: &str = "done";
pub const DOWNLOAD_TRANSLATED_SUBTITLES: &str = "download_translated_subtitles";
pub const DOWNLOAD_VIDEO_WITH_SUBTITLES: &str = "download_video_with_subtitles";

/// Characters left as-is in a query component; everything else is escaped
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds endpoint URLs relative to the server base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "Server URL must use http or https: {}", base_url
            )));
        }

        Ok(Self { base })
    }

    /// URL of a named endpoint, keeping any path prefix of the base URL
    pub fn url(&self, endpoint: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // http(s) URLs always have path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        url
    }

    /// URL of an endpoint taking the server-side video path as query parameter
    pub fn with_video_path(&self, endpoint: &str, video_path: &str) -> Url {
        let mut url = self.url(endpoint);
        let query = format!("video_path={}", utf8_percent_encode(video_path, COMPONENT));
        url.set_query(Some(&query));
        url
    }

    /// Video and subtitle stream locations for an uploaded video
    pub fn preview(&self, video_path: &str) -> MediaPreview {
        MediaPreview {
            video_src: self.with_video_path(GET_VIDEO, video_path),
            subtitles_src: self.with_video_path(GET_SUBTITLES, video_path),
        }
    }
}
