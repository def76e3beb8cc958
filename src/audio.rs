//! Best-effort audio extraction and playback.
//!
//! The input's audio track is transcoded to a temporary PCM WAV by an
//! external tool and handed to rodio for non-blocking playback. Every
//! failure here is non-fatal: callers downgrade errors to warnings and
//! continue video-only.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::timeout;

use crate::{PlayerError, Result};

/// External tool used to transcode the audio track.
pub const EXTRACT_TOOL: &str = "ffmpeg";

/// Bound on the transcode call so a hung tool cannot stall playback forever.
pub const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// An open handle to the default audio output device.
///
/// Probed once at startup and injected into the playback driver; when the
/// probe fails the whole audio path is skipped for the run.
pub struct AudioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioBackend {
    /// Try to open the default output device, returning `None` on failure.
    pub fn probe() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
            }),
            Err(e) => {
                warn!("no audio output device available: {}", e);
                None
            }
        }
    }
}

/// Run the external transcoder, writing 16-bit signed little-endian PCM at
/// 44.1kHz stereo into a fresh temporary WAV file.
///
/// On any failure the partial file is removed when the returned handle is
/// dropped. A timed-out tool is killed and reported as `AudioToolFailed`.
pub async fn extract_pcm(video: &Path, tool: &str, limit: Duration) -> Result<NamedTempFile> {
    let wav = tempfile::Builder::new()
        .prefix("termvid-audio-")
        .suffix(".wav")
        .tempfile()?;

    let mut cmd = Command::new(tool);
    cmd.arg("-y")
        .arg("-i")
        .arg(video)
        .arg("-vn")
        .args(["-acodec", "pcm_s16le", "-ar", "44100", "-ac", "2"])
        .arg(wav.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = match timeout(limit, cmd.status()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PlayerError::AudioToolMissing(tool.to_string()));
        }
        Ok(Err(e)) => return Err(PlayerError::AudioToolFailed(e.to_string())),
        Err(_) => {
            return Err(PlayerError::AudioToolFailed(format!(
                "{} timed out after {}s",
                tool,
                limit.as_secs()
            )));
        }
    };

    if !status.success() {
        return Err(PlayerError::AudioToolFailed(format!(
            "{} exited with {}",
            tool, status
        )));
    }

    debug!("extracted audio track to {}", wav.path().display());
    Ok(wav)
}

/// A running, non-blocking playback of an extracted audio track.
///
/// Owns the temporary WAV file; dropping or finishing the session removes it.
pub struct AudioSession {
    sink: Sink,
    wav: NamedTempFile,
}

impl AudioSession {
    /// Extract the video's audio track and immediately start playing it.
    pub async fn start(backend: &AudioBackend, video: &Path) -> Result<Self> {
        let wav = extract_pcm(video, EXTRACT_TOOL, EXTRACT_TIMEOUT).await?;

        let file = File::open(wav.path()).map_err(|e| PlayerError::AudioLoadFailed(e.to_string()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::AudioLoadFailed(e.to_string()))?;
        let sink =
            Sink::try_new(&backend.handle).map_err(|e| PlayerError::AudioLoadFailed(e.to_string()))?;
        sink.append(source);

        debug!("audio playback started from {}", wav.path().display());
        Ok(Self { sink, wav })
    }

    /// Whether the track is still playing.
    pub fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    /// Block until the track has drained.
    pub fn wait_until_done(&self) {
        self.sink.sleep_until_end();
    }

    /// Stop playback and remove the temporary WAV, warning when removal fails.
    pub fn finish(self) {
        self.sink.stop();
        let path = self.wav.path().to_path_buf();
        if let Err(e) = self.wav.close() {
            warn!(
                "could not remove temporary audio file {}: {}",
                path.display(),
                e
            );
        }
    }
}
