use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Translation server base URL (overrides the configuration file)
    #[arg(long)]
    pub server: Option<String>,

    /// Do not draw the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload, translate and download in one go
    Run {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language for the subtitles
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Directory for the downloaded files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Upload a video file to the server
    Upload {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Translate the subtitles of a previously uploaded video
    Translate {
        /// Job key of the uploaded video (its file name)
        #[arg(short = 'k', long)]
        job_key: String,

        /// Target language for the subtitles
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Read the current translation progress once
    Progress,

    /// Follow the translation progress until it completes
    Watch,

    /// Ask the server whether the last translation has finished
    Status,

    /// Download translation results
    Download {
        #[command(subcommand)]
        target: DownloadTarget,
    },

    /// Save the source subtitles the server generated for an uploaded video
    Subtitles {
        /// Server-side video path returned by the upload
        #[arg(short = 'p', long)]
        video_path: String,

        /// Directory for the subtitle file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum DownloadTarget {
    /// Download the translated subtitle file
    Subtitles {
        /// Directory for the downloaded file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Download the video with embedded translated subtitles
    Video {
        /// Directory for the downloaded file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Language of the subtitled video to fetch
        #[arg(short, long)]
        lang: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration to a file
    Init {
        /// Output file
        #[arg(short, long, default_value = "subweave.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Output directory requested on the command line, if any
    pub fn output_dir(&self) -> Option<&PathBuf> {
        match self {
            Commands::Run { output_dir, .. } | Commands::Subtitles { output_dir, .. } => output_dir.as_ref(),
            Commands::Download { target } => match target {
                DownloadTarget::Subtitles { output_dir } | DownloadTarget::Video { output_dir, .. } => {
                    output_dir.as_ref()
                }
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let args = Args::try_parse_from([
            "subweave", "--server", "http://10.0.0.2:5000", "run", "-i", "talk.mp4", "-t", "de", "-o", "out",
        ])
        .unwrap();

        assert_eq!(args.server.as_deref(), Some("http://10.0.0.2:5000"));
        assert_eq!(args.command.output_dir(), Some(&PathBuf::from("out")));
        match args.command {
            Commands::Run { input, target_lang, .. } => {
                assert_eq!(input, PathBuf::from("talk.mp4"));
                assert_eq!(target_lang.as_deref(), Some("de"));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_download_video() {
        let args = Args::try_parse_from(["subweave", "download", "video", "--lang", "fa", "-o", "dl"]).unwrap();

        assert_eq!(args.command.output_dir(), Some(&PathBuf::from("dl")));
        match args.command {
            Commands::Download { target: DownloadTarget::Video { lang, .. } } => {
                assert_eq!(lang.as_deref(), Some("fa"));
            }
            _ => panic!("expected download video command"),
        }
    }

    #[test]
    fn test_translate_requires_job_key() {
        assert!(Args::try_parse_from(["subweave", "translate"]).is_err());
        assert!(Args::try_parse_from(["subweave", "translate", "-k", "talk.mp4"]).is_ok());
    }

    #[test]
    fn test_parse_config_init() {
        let args = Args::try_parse_from(["subweave", "config", "init", "--force"]).unwrap();

        match args.command {
            Commands::Config { action: ConfigAction::Init { output, force } } => {
                assert_eq!(output, PathBuf::from("subweave.toml"));
                assert!(force);
            }
            _ => panic!("expected config init command"),
        }
    }
}
