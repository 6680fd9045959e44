use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{
    DoneStatus, DownloadBody, Endpoints, MediaPreview, ProgressSnapshot, ServiceApi, TranslateRequest, TranslateResult,
};
use crate::config::{Config, DownloadConfig, PollingConfig};
use crate::download::{save_download, source_subtitles_name};
use crate::error::{Result, ClientError};
use crate::view::{Notice, Trigger, UploadedVideo, ViewModel};

pub const COMPLETION_MESSAGE: &str = "Translation is completed. You can download now.";

/// How a progress polling loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The server reported 100
    Completed,
    /// A progress read failed; carries the failure
    Interrupted(String),
    /// The owning operation or the controller stopped the loop
    Cancelled,
}

/// Drives the translation service on behalf of a view-model.
///
/// Each operation reads its inputs from the view-model, issues its requests
/// through the `ServiceApi`, and reports back by mutating widget state and
/// sending notices.
pub struct ClientController {
    api: Arc<dyn ServiceApi>,
    view: Arc<ViewModel>,
    endpoints: Endpoints,
    polling: PollingConfig,
    download: DownloadConfig,
    shutdown: CancellationToken,
}

impl ClientController {
    pub fn new(config: &Config, api: Arc<dyn ServiceApi>, view: Arc<ViewModel>) -> Result<Self> {
        Ok(Self {
            api,
            view,
            endpoints: Endpoints::new(&config.server.base_url)?,
            polling: config.polling.clone(),
            download: config.download.clone(),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn view(&self) -> &Arc<ViewModel> {
        &self.view
    }

    /// Stop any running progress polling. Used when the client is torn down.
    pub fn shutdown(&self) {
        info!("Shutting down client controller");
        self.shutdown.cancel();
    }

    /// Resolves once `shutdown` has been called
    pub async fn cancelled(&self) {
        self.shutdown.cancelled().await
    }

    /// Treat a video uploaded earlier as the current upload so it can be translated
    pub fn adopt_upload(&self, job_key: &str) -> UploadedVideo {
        let uploaded = UploadedVideo {
            job_key: job_key.to_string(),
            video_path: job_key.to_string(),
        };
        self.view.record_upload(uploaded.clone());
        self.view.set_enabled(Trigger::Translate, true);
        self.show_video_thumbnail(&uploaded.video_path);
        uploaded
    }

    fn reject(&self, message: &str) -> ClientError {
        self.view.notify(Notice::warning(message));
        ClientError::Validation(message.to_string())
    }

    /// Upload the selected file and point the preview at it
    pub async fn upload_video(&self) -> Result<UploadedVideo> {
        let Some(file) = self.view.selected_file() else {
            return Err(self.reject("Please select a video file to upload."));
        };
        let Some(job_key) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Err(self.reject("Please select a video file to upload."));
        };
        if !self.view.take_trigger(Trigger::Upload) {
            return Err(self.reject("An upload is already in progress."));
        }

        self.view.set_enabled(Trigger::Translate, false);
        self.view.clear_upload();
        info!("Uploading {} as job {}", file.display(), job_key);

        let outcome = match self.api.upload(&file).await {
            Ok(upload) => {
                self.view.notify(Notice::success(upload.message.as_str()));

                let uploaded = UploadedVideo {
                    job_key,
                    video_path: upload.video_path,
                };
                self.view.record_upload(uploaded.clone());
                self.view.set_enabled(Trigger::Translate, true);
                self.show_video_thumbnail(&uploaded.video_path);
                Ok(uploaded)
            }
            Err(e) => {
                self.view.notify(Notice::error(format!("Upload failed: {}", e)));
                Err(e)
            }
        };

        self.view.set_enabled(Trigger::Upload, true);
        outcome
    }

    /// Point the media preview at the server's streams for `video_path`
    pub fn show_video_thumbnail(&self, video_path: &str) -> MediaPreview {
        let preview = self.endpoints.preview(video_path);
        debug!("Preview video: {}, subtitles: {}", preview.video_src, preview.subtitles_src);
        self.view.set_preview(preview.clone());
        preview
    }

    /// Start translating the uploaded video while polling progress.
    ///
    /// Downloads are enabled as soon as the server accepts the job; the
    /// polling loop only drives the progress indicator.
    pub async fn translate_subtitles(&self) -> Result<TranslateResult> {
        let Some(uploaded) = self.view.uploaded() else {
            return Err(self.reject("Please upload a video first."));
        };
        if !self.view.take_trigger(Trigger::Translate) {
            return Err(self.reject("A translation is already in progress."));
        }

        let target_language = self.view.target_language();
        self.view.set_enabled(Trigger::DownloadSubtitles, false);
        self.view.set_enabled(Trigger::DownloadVideo, false);
        self.view.show_progress(self.polling.initial_progress);

        let poll_token = self.shutdown.child_token();
        let poller = self.spawn_poller(poll_token.clone());

        let request = TranslateRequest {
            video_file_path: uploaded.job_key,
            target_language: target_language.clone(),
        };
        info!("Translating {} to {}", request.video_file_path, request.target_language);

        let outcome = match self.api.translate(&request).await {
            Ok(result) => {
                self.view.notify(Notice::info(result.message.as_str()));
                self.view.record_translation(target_language);
                self.view.set_enabled(Trigger::DownloadSubtitles, true);
                self.view.set_enabled(Trigger::DownloadVideo, true);

                let polled = join_poller(poller).await;
                debug!("Progress polling ended: {:?}", polled);
                Ok(result)
            }
            Err(e) => {
                self.view.notify(Notice::error(format!("Translation error: {}", e)));
                poll_token.cancel();
                join_poller(poller).await;
                Err(e)
            }
        };

        self.view.set_enabled(Trigger::Translate, true);
        self.view.hide_progress();
        outcome
    }

    fn spawn_poller(&self, token: CancellationToken) -> JoinHandle<PollOutcome> {
        tokio::spawn(poll_progress(
            self.api.clone(),
            self.view.clone(),
            self.polling.interval(),
            token,
        ))
    }

    /// Poll progress until it reaches 100, a read fails, or the controller shuts down
    pub async fn check_progress(&self) -> PollOutcome {
        poll_progress(
            self.api.clone(),
            self.view.clone(),
            self.polling.interval(),
            self.shutdown.child_token(),
        )
        .await
    }

    /// Read progress once and show it on the indicator
    pub async fn read_progress(&self) -> Result<ProgressSnapshot> {
        match self.api.progress().await {
            Ok(snapshot) => {
                self.view.set_progress(snapshot.progress);
                Ok(snapshot)
            }
            Err(e) => {
                self.view.notify(Notice::error(format!("Progress check failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Ask the server whether the last translation finished
    pub async fn translation_status(&self) -> Result<DoneStatus> {
        match self.api.done().await {
            Ok(status) => {
                self.view.notify(Notice::info(status.message.as_str()));
                Ok(status)
            }
            Err(e) => {
                self.view.notify(Notice::error(format!("Status check failed: {}", e)));
                Err(e)
            }
        }
    }

    pub async fn download_translated_subtitles(&self) -> Result<PathBuf> {
        const CONTEXT: &str = "Error downloading subtitles";

        match self.api.download_translated_subtitles().await {
            Ok(body) => self.materialize(&self.download.subtitles_filename, body, CONTEXT).await,
            Err(e) => {
                self.view.notify(Notice::error(format!("{}: {}", CONTEXT, e)));
                Err(e)
            }
        }
    }

    pub async fn download_video_with_subtitles(&self) -> Result<PathBuf> {
        const CONTEXT: &str = "Download error";

        let lang = self.view.translated_language();
        match self.api.download_video_with_subtitles(lang).await {
            Ok(body) => self.materialize(&self.download.video_filename, body, CONTEXT).await,
            Err(e) => {
                self.view.notify(Notice::error(format!("{}: {}", CONTEXT, e)));
                Err(e)
            }
        }
    }

    /// Save the source subtitle track of an uploaded video next to the other downloads
    pub async fn fetch_source_subtitles(&self, video_path: &str) -> Result<PathBuf> {
        const CONTEXT: &str = "Error fetching subtitles";

        match self.api.fetch_subtitles(video_path).await {
            Ok(body) => self.materialize(&source_subtitles_name(video_path), body, CONTEXT).await,
            Err(e) => {
                self.view.notify(Notice::error(format!("{}: {}", CONTEXT, e)));
                Err(e)
            }
        }
    }

    async fn materialize(&self, file_name: &str, body: DownloadBody, context: &str) -> Result<PathBuf> {
        match save_download(&self.download.output_dir, file_name, body).await {
            Ok(path) => {
                self.view.notify(Notice::success(format!("Saved {}", path.display())));
                Ok(path)
            }
            Err(e) => {
                self.view.notify(Notice::error(format!("{}: {}", context, e)));
                Err(e)
            }
        }
    }
}

async fn join_poller(poller: JoinHandle<PollOutcome>) -> PollOutcome {
    match poller.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Progress polling task failed: {}", e);
            PollOutcome::Interrupted(e.to_string())
        }
    }
}

/// Poll `/progress` every `interval` and mirror it on the view's progress indicator.
///
/// Unless cancelled, the indicator ends at 100: after completion a completion
/// notice is sent, after a failed read a warning is sent instead.
pub async fn poll_progress(
    api: Arc<dyn ServiceApi>,
    view: Arc<ViewModel>,
    interval: Duration,
    token: CancellationToken,
) -> PollOutcome {
    let outcome = loop {
        tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }

        let read = tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            read = api.progress() => read,
        };

        match read {
            Ok(snapshot) => {
                debug!("Progress: {}%", snapshot.progress);
                view.set_progress(snapshot.progress);
                if snapshot.is_complete() {
                    break PollOutcome::Completed;
                }
            }
            Err(e) => {
                warn!("Progress check failed: {}", e);
                break PollOutcome::Interrupted(e.to_string());
            }
        }
    };

    view.set_progress(100);
    match &outcome {
        PollOutcome::Completed => view.notify(Notice::success(COMPLETION_MESSAGE)),
        PollOutcome::Interrupted(reason) => view.notify(Notice::warning(format!(
            "Progress updates stopped ({}). The translation may still be running; check its status before downloading.",
            reason
        ))),
        PollOutcome::Cancelled => {}
    }

    outcome
}
