//! Subweave - Subtitle Translation Service Client
//!
//! A command-line client for a video subtitle translation web service:
//! upload a video, start a translation job, follow its progress, and
//! download the translated subtitles and the subtitled video.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod view;
