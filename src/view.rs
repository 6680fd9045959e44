//! View-model for the client.
//!
//! Holds the state of every widget the controller drives (triggers, progress
//! indicator, media preview) together with the two output seams: a
//! [`Notifier`] for user-visible messages and a [`ProgressDisplay`] that
//! renders the progress indicator.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::api::MediaPreview;

/// Log target of user notices. The notifier already shows them, so the
/// console log layer leaves this target out.
pub const NOTICE_TARGET: &str = "subweave::notice";

/// User actions that can be enabled or disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Upload,
    Translate,
    DownloadSubtitles,
    DownloadVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Delivers notices to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Renders the progress indicator
pub trait ProgressDisplay: Send + Sync {
    fn show(&self, value: u8);
    fn set(&self, value: u8);
    fn hide(&self);
}

/// The video the server accepted, and the key that names its translation job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    pub job_key: String,
    pub video_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected_file: Option<PathBuf>,
    pub target_language: String,
    pub upload_enabled: bool,
    pub translate_enabled: bool,
    pub download_subtitles_enabled: bool,
    pub download_video_enabled: bool,
    pub progress_visible: bool,
    pub progress: u8,
    pub preview: Option<MediaPreview>,
    pub uploaded: Option<UploadedVideo>,
    /// Language of the last translation the server accepted
    pub translated_language: Option<String>,
}

impl ViewState {
    fn new(target_language: String) -> Self {
        Self {
            selected_file: None,
            target_language,
            upload_enabled: true,
            translate_enabled: false,
            download_subtitles_enabled: false,
            download_video_enabled: false,
            progress_visible: false,
            progress: 0,
            preview: None,
            uploaded: None,
            translated_language: None,
        }
    }

    fn trigger_mut(&mut self, trigger: Trigger) -> &mut bool {
        match trigger {
            Trigger::Upload => &mut self.upload_enabled,
            Trigger::Translate => &mut self.translate_enabled,
            Trigger::DownloadSubtitles => &mut self.download_subtitles_enabled,
            Trigger::DownloadVideo => &mut self.download_video_enabled,
        }
    }
}

pub struct ViewModel {
    state: Mutex<ViewState>,
    notifier: Arc<dyn Notifier>,
    progress: Arc<dyn ProgressDisplay>,
}

impl ViewModel {
    pub fn new(
        target_language: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        progress: Arc<dyn ProgressDisplay>,
    ) -> Self {
        Self {
            state: Mutex::new(ViewState::new(target_language.into())),
            notifier,
            progress,
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        // The state stays consistent even if a holder panicked; every write is a single assignment
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    pub fn select_file(&self, path: impl AsRef<Path>) {
        self.state().selected_file = Some(path.as_ref().to_path_buf());
    }

    pub fn selected_file(&self) -> Option<PathBuf> {
        self.state().selected_file.clone()
    }

    pub fn select_language(&self, language: impl Into<String>) {
        self.state().target_language = language.into();
    }

    pub fn target_language(&self) -> String {
        self.state().target_language.clone()
    }

    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        *self.state().trigger_mut(trigger)
    }

    pub fn set_enabled(&self, trigger: Trigger, enabled: bool) {
        *self.state().trigger_mut(trigger) = enabled;
    }

    /// Disable a trigger, returning whether it was enabled
    pub fn take_trigger(&self, trigger: Trigger) -> bool {
        std::mem::replace(self.state().trigger_mut(trigger), false)
    }

    pub fn show_progress(&self, value: u8) {
        {
            let mut state = self.state();
            state.progress_visible = true;
            state.progress = value;
        }
        self.progress.show(value);
    }

    pub fn set_progress(&self, value: u8) {
        self.state().progress = value;
        self.progress.set(value);
    }

    pub fn hide_progress(&self) {
        self.state().progress_visible = false;
        self.progress.hide();
    }

    pub fn set_preview(&self, preview: MediaPreview) {
        self.state().preview = Some(preview);
    }

    pub fn record_upload(&self, uploaded: UploadedVideo) {
        self.state().uploaded = Some(uploaded);
    }

    /// Forget the previous upload and its preview
    pub fn clear_upload(&self) {
        let mut state = self.state();
        state.uploaded = None;
        state.preview = None;
    }

    pub fn uploaded(&self) -> Option<UploadedVideo> {
        self.state().uploaded.clone()
    }

    pub fn record_translation(&self, language: impl Into<String>) {
        self.state().translated_language = Some(language.into());
    }

    pub fn translated_language(&self) -> Option<String> {
        self.state().translated_language.clone()
    }

    pub fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!(target: NOTICE_TARGET, "{}", notice.message),
            NoticeLevel::Warning => warn!(target: NOTICE_TARGET, "{}", notice.message),
            NoticeLevel::Error => error!(target: NOTICE_TARGET, "{}", notice.message),
        }
        self.notifier.notify(&notice);
    }
}

/// Terminal rendering: notices on stdout, progress as an indicatif bar
#[derive(Default)]
pub struct Terminal {
    bar: Mutex<Option<ProgressBar>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for Terminal {
    fn notify(&self, notice: &Notice) {
        let line = match notice.level {
            NoticeLevel::Info => notice.message.clone(),
            NoticeLevel::Success => format!("✔ {}", notice.message),
            NoticeLevel::Warning => format!("! {}", notice.message),
            NoticeLevel::Error => format!("✘ {}", notice.message),
        };

        match self.bar().as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl ProgressDisplay for Terminal {
    fn show(&self, value: u8) {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_position(value as u64);

        if let Some(previous) = self.bar().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn set(&self, value: u8) {
        if let Some(bar) = self.bar().as_ref() {
            bar.set_position(value as u64);
        }
    }

    fn hide(&self) {
        if let Some(bar) = self.bar().take() {
            bar.finish_and_clear();
        }
    }
}

/// Progress display that renders nothing
pub struct NoProgress;

impl ProgressDisplay for NoProgress {
    fn show(&self, _value: u8) {}
    fn set(&self, _value: u8) {}
    fn hide(&self) {}
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_initial_state() {
        let recorded = recorded_view();
        let state = recorded.view.snapshot();

        assert!(state.upload_enabled);
        assert!(!state.translate_enabled);
        assert!(!state.download_subtitles_enabled);
        assert!(!state.download_video_enabled);
        assert!(!state.progress_visible);
        assert_eq!(state.progress, 0);
        assert_eq!(state.target_language, "fa");
        assert!(state.uploaded.is_none());
    }

    #[test]
    fn test_triggers_toggle_independently() {
        let recorded = recorded_view();
        let view = &recorded.view;

        view.set_enabled(Trigger::DownloadVideo, true);
        view.set_enabled(Trigger::Upload, false);

        assert!(view.is_enabled(Trigger::DownloadVideo));
        assert!(!view.is_enabled(Trigger::DownloadSubtitles));
        assert!(!view.is_enabled(Trigger::Upload));
        assert!(!view.is_enabled(Trigger::Translate));

        assert!(view.take_trigger(Trigger::DownloadVideo));
        assert!(!view.take_trigger(Trigger::DownloadVideo));
        assert!(!view.is_enabled(Trigger::DownloadVideo));
    }

    #[test]
    fn test_progress_forwards_to_display() {
        let recorded = recorded_view();
        let view = &recorded.view;

        view.show_progress(5);
        assert!(view.snapshot().progress_visible);
        view.set_progress(40);
        view.hide_progress();

        let state = view.snapshot();
        assert!(!state.progress_visible);
        assert_eq!(state.progress, 40);
        assert_eq!(
            recorded.progress.events(),
            vec![ProgressEvent::Show(5), ProgressEvent::Set(40), ProgressEvent::Hide]
        );
    }

    #[test]
    fn test_notify_forwards_to_notifier() {
        let recorded = recorded_view();
        recorded.view.notify(Notice::error("Upload failed: boom"));

        assert_eq!(recorded.notifier.notices(), vec![Notice::error("Upload failed: boom")]);
    }

    #[test]
    fn test_terminal_progress_lifecycle() {
        let terminal = Terminal::new();
        terminal.set(10);
        terminal.show(5);
        terminal.set(50);
        assert_eq!(terminal.bar().as_ref().map(|b| b.position()), Some(50));
        terminal.hide();
        assert!(terminal.bar().is_none());
    }
}
