use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use url::Url;

use crate::config::ServerConfig;
use crate::error::{Result, ClientError};
use super::endpoints::{self, Endpoints};
use super::{
    DoneStatus, DownloadBody, ErrorBody, ProgressSnapshot, ServiceApi, TranslateRequest, TranslateResult,
    UploadResult,
};

/// reqwest-backed client for the translation server
pub struct HttpServiceApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpServiceApi {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let endpoints = Endpoints::new(&config.base_url)?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { client, endpoints })
    }

    async fn get_body(&self, url: Url, fallback: &str) -> Result<DownloadBody> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response, fallback).await?;
        if let Some(length) = response.content_length() {
            debug!("Receiving {} bytes", length);
        }
        Ok(DownloadBody::from_response(response))
    }
}

/// Turn a non-success response into `ClientError::Server`, preferring the body's `error` field
async fn ensure_success(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    debug!("Server returned {}: {}", status, message);
    Err(ClientError::Server { status, message })
}

#[async_trait]
impl ServiceApi for HttpServiceApi {
    async fn upload(&self, file: &Path) -> Result<UploadResult> {
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Validation(format!("Not a file: {}", file.display())))?;

        let handle = tokio::fs::File::open(file).await?;
        let length = handle.metadata().await?.len();
        info!("Uploading {} ({} bytes)", file.display(), length);

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), length)
            .file_name(file_name);
        let form = Form::new().part("file", part);

        let response = self.client
            .post(self.endpoints.url(endpoints::UPLOAD))
            .multipart(form)
            .send()
            .await?;

        let response = ensure_success(response, "Upload failed.").await?;
        Ok(response.json().await?)
    }

    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResult> {
        debug!("Requesting translation of {} to {}", request.video_file_path, request.target_language);

        let response = self.client
            .post(self.endpoints.url(endpoints::TRANSLATE))
            .json(request)
            .send()
            .await?;

        let response = ensure_success(response, "Translation failed.").await?;
        Ok(response.json().await?)
    }

    async fn progress(&self) -> Result<ProgressSnapshot> {
        let response = self.client
            .get(self.endpoints.url(endpoints::PROGRESS))
            .send()
            .await?;

        let response = ensure_success(response, "Progress check failed.").await?;
        let body: Value = response.json().await?;
        Ok(ProgressSnapshot::from_value(&body))
    }

    async fn done(&self) -> Result<DoneStatus> {
        let response = self.client
            .get(self.endpoints.url(endpoints::DONE))
            .send()
            .await?;

        let response = ensure_success(response, "Status check failed.").await?;
        Ok(response.json().await?)
    }

    async fn fetch_subtitles(&self, video_path: &str) -> Result<DownloadBody> {
        let url = self.endpoints.with_video_path(endpoints::GET_SUBTITLES, video_path);
        self.get_body(url, "Subtitles file not found.").await
    }

    async fn download_translated_subtitles(&self) -> Result<DownloadBody> {
        let url = self.endpoints.url(endpoints::DOWNLOAD_TRANSLATED_SUBTITLES);
        self.get_body(url, "Subtitle file not found.").await
    }

    async fn download_video_with_subtitles(&self, lang: Option<String>) -> Result<DownloadBody> {
        let mut url = self.endpoints.url(endpoints::DOWNLOAD_VIDEO_WITH_SUBTITLES);
        if let Some(lang) = lang {
            url.query_pairs_mut().append_pair("lang", &lang);
        }
        self.get_body(url, "Download failed.").await
    }
}
