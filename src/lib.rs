//! termvid - play videos in the terminal as ASCII art
//!
//! This crate decodes a video file frame by frame, quantizes each frame's
//! luminance onto a fixed character ramp, and prints the resulting text
//! blocks in sequence to approximate playback. The video's audio track is
//! optionally extracted to PCM with an external transcoder and played
//! through the system audio backend. Audio is a pure enhancement: any
//! failure on the audio path degrades to silent, video-only playback.

pub mod ascii;
pub mod audio;
pub mod cli;
pub mod decoder;
pub mod player;
pub mod term;

pub use ascii::{ramp_char, AsciiRenderer, ASCII_RAMP};
pub use audio::{AudioBackend, AudioSession};
pub use cli::Cli;
pub use decoder::{open_video, Frames, RawFrame, VideoSource};
pub use player::{
    frame_interval, play, play_with_interrupt, PlayOptions, PlaybackSummary, StopReason,
};

use std::path::PathBuf;

/// Errors surfaced by the player.
///
/// The audio variants are always caught and downgraded to warnings; only
/// `InputNotFound`, `Decode` and `Io` ever abort playback.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error("video file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("video decoding error: {0}")]
    Decode(#[from] ffmpeg_next::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio tool `{0}` not found on PATH")]
    AudioToolMissing(String),

    #[error("audio extraction failed: {0}")]
    AudioToolFailed(String),

    #[error("audio load failed: {0}")]
    AudioLoadFailed(String),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, PlayerError>;
