//! Playback driver: pulls frames, renders them, paces terminal output.

use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use tokio::time::sleep;

use crate::ascii::AsciiRenderer;
use crate::audio::{AudioBackend, AudioSession};
use crate::decoder::open_video;
use crate::term::Terminal;
use crate::Result;

/// Fallback frame rate when neither the container nor the user supplies one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Resolved playback settings.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Video file to play.
    pub input: PathBuf,
    /// Output width in characters.
    pub width: u32,
    /// Frame rate used only when the container reports none (0 = unset).
    pub requested_fps: f64,
    /// Whether to attempt audio playback at all.
    pub audio: bool,
    /// After the last frame, block until the audio track drains.
    pub wait_for_audio: bool,
}

/// Why the playback loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stream ran out of frames (normal termination).
    Exhausted,
    /// The user requested a stop mid-playback.
    Interrupted,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackSummary {
    pub reason: StopReason,
    pub frames_shown: u64,
}

/// Time to sleep after each printed frame.
///
/// The container's native rate wins when it reports a positive one; the
/// user-supplied rate is only a fallback. Pacing is fixed-delay, so actual
/// playback drifts by the cost of render and print.
pub fn frame_interval(source_fps: f64, requested_fps: f64) -> Duration {
    let fps = if source_fps > 0.0 {
        source_fps
    } else if requested_fps > 0.0 {
        requested_fps
    } else {
        DEFAULT_FPS
    };
    Duration::from_secs_f64(1.0 / fps)
}

/// Play a video to the terminal, with best-effort audio.
///
/// The audio session starts fire-and-forget before the first frame; all of
/// its failures downgrade to warnings. Terminal state and the temporary
/// audio file are released on every exit path.
pub async fn play(opts: &PlayOptions, backend: Option<&AudioBackend>) -> Result<PlaybackSummary> {
    play_with_interrupt(opts, backend, || false).await
}

/// Like [`play`], with an additional stop signal polled once per frame.
///
/// `stop` is checked alongside the interrupt keys and triggers the same
/// cleanup path; it lets embedders and tests request an interrupt without a
/// terminal event.
pub async fn play_with_interrupt(
    opts: &PlayOptions,
    backend: Option<&AudioBackend>,
    mut stop: impl FnMut() -> bool,
) -> Result<PlaybackSummary> {
    let mut frames = open_video(&opts.input)?;
    let interval = frame_interval(frames.source().fps(), opts.requested_fps);
    let (width, height) = frames.source().dimensions();
    info!(
        "playing {} ({}x{}) at {:.2} fps",
        opts.input.display(),
        width,
        height,
        1.0 / interval.as_secs_f64()
    );

    let audio = match backend {
        Some(backend) if opts.audio => match AudioSession::start(backend, &opts.input).await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("audio disabled: {}", e);
                None
            }
        },
        _ => None,
    };

    let renderer = AsciiRenderer::new(opts.width);
    let mut term = Terminal::new();
    term.enter()?;

    let mut frames_shown = 0u64;
    let reason = loop {
        if stop() || term.interrupt_requested()? {
            break StopReason::Interrupted;
        }
        match frames.next() {
            Some(Ok(frame)) => {
                term.draw(&renderer.render(&frame))?;
                frames_shown += 1;
                sleep(interval).await;
            }
            // Dropping `term` and `audio` restores the terminal and removes
            // the temporary WAV even on a decode failure.
            Some(Err(e)) => return Err(e),
            None => break StopReason::Exhausted,
        }
    };

    term.leave()?;
    if reason == StopReason::Interrupted {
        println!("Playback interrupted.");
    }

    if let Some(session) = audio {
        if opts.wait_for_audio && reason == StopReason::Exhausted && session.is_playing() {
            info!("waiting for audio track to finish");
            session.wait_until_done();
        }
        session.finish();
    }

    info!("playback stopped after {} frames", frames_shown);
    Ok(PlaybackSummary {
        reason,
        frames_shown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerError;

    #[test]
    fn source_rate_wins_over_requested_rate() {
        let interval = frame_interval(24.0, 60.0);
        assert!((interval.as_secs_f64() - 1.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn requested_rate_is_only_a_fallback() {
        let interval = frame_interval(0.0, 12.0);
        assert!((interval.as_secs_f64() - 1.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn default_rate_applies_when_nothing_is_known() {
        let interval = frame_interval(0.0, 0.0);
        assert!((interval.as_secs_f64() - 1.0 / DEFAULT_FPS).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_input_aborts_before_any_playback() {
        let opts = PlayOptions {
            input: PathBuf::from("no-such-video.mp4"),
            width: 80,
            requested_fps: 0.0,
            audio: false,
            wait_for_audio: false,
        };
        let result = play(&opts, None).await;
        assert!(matches!(result, Err(PlayerError::InputNotFound(_))));
    }
}
