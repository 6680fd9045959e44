use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{Result, ClientError};

// Default values used when a config file omits a field
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_user_agent() -> String {
    format!("subweave/{}", env!("CARGO_PKG_VERSION"))
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_initial_progress() -> u8 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_subtitles_filename() -> String {
    "translated_subtitles.vtt".to_string()
}

fn default_video_filename() -> String {
    "video_with_subtitles.mp4".to_string()
}

fn default_target_language() -> String {
    "fa".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the translation service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds; requests wait indefinitely when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay before each progress read
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Value shown on the progress indicator when a translation starts
    #[serde(default = "default_initial_progress")]
    pub initial_progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory that receives downloaded files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name for the translated subtitle track
    #[serde(default = "default_subtitles_filename")]
    pub subtitles_filename: String,
    /// File name for the video with embedded subtitles
    #[serde(default = "default_video_filename")]
    pub video_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Language used when none is given on the command line
    #[serde(default = "default_target_language")]
    pub default_target_language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            initial_progress: default_initial_progress(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            subtitles_filename: default_subtitles_filename(),
            video_filename: default_video_filename(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            default_target_language: default_target_language(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ClientError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Write the default configuration to `path`, leaving an existing file alone unless `force`
    pub fn init_file<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(ClientError::Config(format!(
                "{} already exists, pass --force to overwrite it", path.display()
            )));
        }

        Self::default().save_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.polling.interval(), Duration::from_secs(2));
        assert_eq!(config.polling.initial_progress, 5);
        assert_eq!(config.download.subtitles_filename, "translated_subtitles.vtt");
        assert_eq!(config.download.video_filename, "video_with_subtitles.mp4");
        assert_eq!(config.server.request_timeout_secs, None);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            "[server]\nbase_url = \"http://media.local:8080\"\n\n[polling]\ninterval_ms = 250\n",
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://media.local:8080");
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.polling.initial_progress, 5);
        assert_eq!(config.download, DownloadConfig::default());
        assert_eq!(config.translate.default_target_language, "fa");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subweave.toml");

        let mut config = Config::default();
        config.translate.default_target_language = "de".to_string();
        config.server.request_timeout_secs = Some(30);
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/subweave.toml").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_init_file_writes_defaults_and_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subweave.toml");
        std::fs::write(&path, "[server\nbase_url = broken").unwrap();

        let err = Config::init_file(&path, false).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[server\nbase_url = broken");

        Config::init_file(&path, true).unwrap();
        let written = Config::from_file(&path).unwrap();
        assert_eq!(written.server.base_url, Config::default().server.base_url);
        assert_eq!(written.translate.default_target_language, "fa");
    }
}
