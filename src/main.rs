//! Subweave - Subtitle Translation Service Client
//!
//! Entry point for the command-line client. Each subcommand drives one or
//! more controller operations against the configured translation server.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use subweave::api::ServiceApiFactory;
use subweave::cli::{Args, Commands, ConfigAction, DownloadTarget};
use subweave::config::Config;
use subweave::controller::ClientController;
use subweave::error::ClientError;
use subweave::view::{NoProgress, ProgressDisplay, Terminal, ViewModel, NOTICE_TARGET};

const DEFAULT_CONFIG_FILE: &str = "subweave.toml";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    let _log_guard = setup_logging(args.verbose)?;
    info!("Starting Subweave - Subtitle Translation Service Client");

    // Writing the defaults must not depend on the file being replaced
    if let Commands::Config { action: ConfigAction::Init { output, force } } = &args.command {
        Config::init_file(output, *force)?;
        println!("Wrote default configuration to {}", output.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(output_dir) = args.command.output_dir() {
        config.download.output_dir = output_dir.clone();
    }
    info!("Using translation server at {}", config.server.base_url);

    let terminal = Arc::new(Terminal::new());
    let progress: Arc<dyn ProgressDisplay> = if args.quiet {
        Arc::new(NoProgress)
    } else {
        terminal.clone()
    };
    let view = Arc::new(ViewModel::new(
        config.translate.default_target_language.clone(),
        terminal,
        progress,
    ));

    let api = ServiceApiFactory::create_default(&config.server)?;
    let controller = Arc::new(ClientController::new(&config, api, view)?);

    // Ctrl+C tears the controller down so polling stops and the command returns
    let signal_controller = controller.clone();
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            warn!("Received Ctrl+C signal, stopping...");
            signal_controller.shutdown();
        }
    });

    let result = tokio::select! {
        result = execute(&controller, args.command) => result,
        _ = controller.cancelled() => return Err(ClientError::Cancelled.into()),
    };

    match result {
        Ok(()) => {
            info!("Subweave completed successfully");
            Ok(ExitCode::SUCCESS)
        }
        // Controller failures have already been shown as notices
        Err(e) if e.downcast_ref::<ClientError>().is_some() => {
            info!("Subweave stopped: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

async fn execute(controller: &ClientController, command: Commands) -> Result<()> {
    let view = controller.view();

    match command {
        Commands::Run { input, target_lang, .. } => {
            info!("Running full translation for {}", input.display());
            view.select_file(&input);
            if let Some(lang) = target_lang {
                view.select_language(lang);
            }

            controller.upload_video().await?;
            controller.translate_subtitles().await?;
            controller.download_translated_subtitles().await?;
            controller.download_video_with_subtitles().await?;
        }
        Commands::Upload { input } => {
            view.select_file(&input);
            let uploaded = controller.upload_video().await?;
            println!("Job key: {}", uploaded.job_key);
            if let Some(preview) = view.snapshot().preview {
                println!("Video:     {}", preview.video_src);
                println!("Subtitles: {}", preview.subtitles_src);
            }
        }
        Commands::Translate { job_key, target_lang } => {
            if let Some(lang) = target_lang {
                view.select_language(lang);
            }
            controller.adopt_upload(&job_key);
            controller.translate_subtitles().await?;
        }
        Commands::Progress => {
            let snapshot = controller.read_progress().await?;
            println!("{}%", snapshot.progress);
        }
        Commands::Watch => {
            view.show_progress(0);
            let outcome = controller.check_progress().await;
            view.hide_progress();
            info!("Progress polling ended: {:?}", outcome);
        }
        Commands::Status => {
            controller.translation_status().await?;
        }
        Commands::Download { target } => match target {
            DownloadTarget::Subtitles { .. } => {
                controller.download_translated_subtitles().await?;
            }
            DownloadTarget::Video { lang, .. } => {
                if let Some(lang) = lang {
                    view.record_translation(lang);
                }
                controller.download_video_with_subtitles().await?;
            }
        },
        Commands::Subtitles { video_path, .. } => {
            controller.fetch_source_subtitles(&video_path).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subweave").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subweave.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Notices already reach the terminal, so the console only carries warnings unless verbose
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let file_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_filter(console_filter(console_level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false) // No ANSI colors in file
        .with_filter(file_level);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(file_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - file: {}", log_dir.join("subweave.log").display());

    Ok(guard)
}

/// Console filter: notices are already printed by the terminal notifier
fn console_filter(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(NOTICE_TARGET, LevelFilter::OFF)
}
