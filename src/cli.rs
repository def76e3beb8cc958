//! Command-line arguments and interactive prompts.
//!
//! Anything not supplied on the command line is asked for on stdin, matching
//! a line-based prompt flow: video path, output width (default 80), and a
//! fallback frame rate. Non-numeric answers fall back to the default
//! silently; end of input does the same.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::player::PlayOptions;

/// Default output width in characters.
pub const DEFAULT_WIDTH: u32 = 80;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the video file to play (prompted for when omitted)
    pub input: Option<PathBuf>,

    /// Output width in characters
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Frame rate used when the container does not report one
    #[arg(short, long)]
    pub fps: Option<f64>,

    /// Disable audio playback
    #[arg(long)]
    pub no_audio: bool,

    /// After the last frame, wait for the audio track to finish
    #[arg(long)]
    pub wait_audio: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the final playback options, prompting for missing values.
    pub fn resolve(self) -> io::Result<PlayOptions> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        self.resolve_with(&mut lines)
    }

    fn resolve_with(
        self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> io::Result<PlayOptions> {
        let input = match self.input {
            Some(path) => path,
            None => PathBuf::from(prompt(lines, "Enter the path to the video file: ")?.trim()),
        };

        let width = match self.width {
            Some(width) => width,
            None => prompt(lines, &format!("Terminal width (default {}): ", DEFAULT_WIDTH))?
                .trim()
                .parse()
                .unwrap_or(DEFAULT_WIDTH),
        };

        let requested_fps = match self.fps {
            Some(fps) => fps,
            None => prompt(lines, "FPS (default: use video FPS): ")?
                .trim()
                .parse()
                .unwrap_or(0.0),
        };

        Ok(PlayOptions {
            input,
            width: width.max(1),
            requested_fps: requested_fps.max(0.0),
            audio: !self.no_audio,
            wait_for_audio: self.wait_audio,
        })
    }
}

/// Print a prompt and read one line; end of input yields an empty answer.
fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    message: &str,
) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    lines.next().unwrap_or_else(|| Ok(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(input: Option<&str>, width: Option<u32>, fps: Option<f64>) -> Cli {
        Cli {
            input: input.map(PathBuf::from),
            width,
            fps,
            no_audio: false,
            wait_audio: false,
            verbose: false,
        }
    }

    fn answers(lines: &[&str]) -> impl Iterator<Item = io::Result<String>> {
        lines
            .iter()
            .map(|l| Ok(l.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn flags_skip_all_prompts() {
        let opts = cli(Some("movie.mp4"), Some(120), Some(24.0))
            .resolve_with(&mut answers(&[]))
            .unwrap();
        assert_eq!(opts.input, PathBuf::from("movie.mp4"));
        assert_eq!(opts.width, 120);
        assert_eq!(opts.requested_fps, 24.0);
    }

    #[test]
    fn prompts_fill_in_missing_values() {
        let opts = cli(None, None, None)
            .resolve_with(&mut answers(&["movie.mp4", "100", "24"]))
            .unwrap();
        assert_eq!(opts.input, PathBuf::from("movie.mp4"));
        assert_eq!(opts.width, 100);
        assert_eq!(opts.requested_fps, 24.0);
    }

    #[test]
    fn non_numeric_answers_fall_back_to_defaults_silently() {
        let opts = cli(Some("movie.mp4"), None, None)
            .resolve_with(&mut answers(&["lots", "many"]))
            .unwrap();
        assert_eq!(opts.width, DEFAULT_WIDTH);
        assert_eq!(opts.requested_fps, 0.0);
    }

    #[test]
    fn end_of_input_behaves_like_empty_answers() {
        let opts = cli(Some("movie.mp4"), None, None)
            .resolve_with(&mut answers(&[]))
            .unwrap();
        assert_eq!(opts.width, DEFAULT_WIDTH);
        assert_eq!(opts.requested_fps, 0.0);
    }

    #[test]
    fn zero_width_is_clamped_to_one() {
        let opts = cli(Some("movie.mp4"), Some(0), Some(0.0))
            .resolve_with(&mut answers(&[]))
            .unwrap();
        assert_eq!(opts.width, 1);
    }
}
