// Translation service API
//
// This module describes the HTTP contract with the translation server:
// - Types: request and response bodies exchanged with the server
// - Body: streamed bodies of file downloads
// - Endpoints: URL construction relative to the configured base URL
// - Http: reqwest-backed implementation of the ServiceApi trait

pub mod body;
pub mod endpoints;
pub mod http;
pub mod types;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use body::DownloadBody;
pub use endpoints::*;
pub use http::HttpServiceApi;
pub use types::*;

use crate::config::ServerConfig;
use crate::error::Result;

/// Network operations offered by the translation server.
///
/// Every method issues exactly one request. Non-success statuses come back as
/// `ClientError::Server` carrying the server's `error` field when present.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceApi: Send + Sync {
    /// Upload a video as multipart field `file`
    async fn upload(&self, file: &Path) -> Result<UploadResult>;

    /// Start a translation job
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResult>;

    /// Read the current job progress
    async fn progress(&self) -> Result<ProgressSnapshot>;

    /// Ask the server whether the last job has finished
    async fn done(&self) -> Result<DoneStatus>;

    /// Fetch the source subtitle track of an uploaded video
    async fn fetch_subtitles(&self, video_path: &str) -> Result<DownloadBody>;

    /// Retrieve the translated subtitle file
    async fn download_translated_subtitles(&self) -> Result<DownloadBody>;

    /// Retrieve the video with embedded subtitles, optionally for a specific language
    async fn download_video_with_subtitles(&self, lang: Option<String>) -> Result<DownloadBody>;
}

/// Factory for creating service API instances
pub struct ServiceApiFactory;

impl ServiceApiFactory {
    /// Create the default HTTP implementation
    pub fn create_default(config: &ServerConfig) -> Result<Arc<dyn ServiceApi>> {
        Ok(Arc::new(HttpServiceApi::new(config)?))
    }
}
