//! Video frame source built on FFmpeg.

use ffmpeg_next as ffmpeg;
use log::{debug, info};
use std::path::Path;

use crate::{PlayerError, Result};

/// One decoded frame as packed RGB24 samples.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Row-major RGB24 data, `width * height * 3` bytes.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Zero-based position in the stream.
    pub index: u64,
}

/// Owns the demuxer and decoder for the input's best video stream.
///
/// Opened once per run; dropping the source releases all decoder resources.
pub struct VideoSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: Option<ffmpeg::software::scaling::Context>,
    fps: f64,
    frames_decoded: u64,
    flushed: bool,
}

impl VideoSource {
    /// Open a video file and prepare its best video stream for decoding.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlayerError::InputNotFound(path.to_path_buf()));
        }

        ffmpeg::init()?;
        let input = ffmpeg::format::input(&path)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(ffmpeg::Error::StreamNotFound)?;
        let stream_index = stream.index();

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        info!(
            "opened {}: stream {}, {}x{}, {:.2} fps",
            path.display(),
            stream_index,
            decoder.width(),
            decoder.height(),
            fps
        );

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler: None,
            fps,
            frames_decoded: 0,
            flushed: false,
        })
    }

    /// Native frame rate, or 0.0 when the container does not report one.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Native video dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    /// Frames decoded so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Decode the next frame, or `None` once the stream is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        let mut decoded = ffmpeg::frame::Video::empty();
        loop {
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => {
                    let frame = self.to_rgb(&decoded)?;
                    self.frames_decoded += 1;
                    debug!(
                        "decoded frame {}: {}x{}",
                        frame.index, frame.width, frame.height
                    );
                    return Ok(Some(frame));
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::ffi::EAGAIN => {
                    // Decoder wants more input before it can emit a frame.
                }
                Err(ffmpeg::Error::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }

            match self.read_packet() {
                Some(packet) => self.decoder.send_packet(&packet)?,
                None if !self.flushed => {
                    self.decoder.send_eof()?;
                    self.flushed = true;
                }
                None => return Ok(None),
            }
        }
    }

    /// Pull the next demuxed packet belonging to the video stream.
    fn read_packet(&mut self) -> Option<ffmpeg::Packet> {
        let stream_index = self.stream_index;
        self.input
            .packets()
            .find_map(|(stream, packet)| (stream.index() == stream_index).then_some(packet))
    }

    /// Convert a decoded frame to packed RGB24 at its native size.
    fn to_rgb(&mut self, frame: &ffmpeg::frame::Video) -> Result<RawFrame> {
        let width = frame.width();
        let height = frame.height();

        if self.scaler.is_none() {
            self.scaler = Some(ffmpeg::software::scaling::Context::get(
                frame.format(),
                width,
                height,
                ffmpeg::format::Pixel::RGB24,
                width,
                height,
                ffmpeg::software::scaling::Flags::BILINEAR,
            )?);
        }
        let scaler = self.scaler.as_mut().ok_or(ffmpeg::Error::Bug)?;

        let mut rgb = ffmpeg::frame::Video::empty();
        scaler.run(frame, &mut rgb)?;

        // The scaled plane may carry per-row padding; copy row by row so the
        // output is tightly packed.
        let stride = rgb.stride(0);
        let row_len = width as usize * 3;
        let plane = rgb.data(0);
        let mut data = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            data.extend_from_slice(&plane[start..start + row_len]);
        }

        Ok(RawFrame {
            data,
            width,
            height,
            index: self.frames_decoded,
        })
    }
}

/// Iterator adapter over a [`VideoSource`].
pub struct Frames {
    source: VideoSource,
}

impl Frames {
    pub fn new(source: VideoSource) -> Self {
        Self { source }
    }

    /// The underlying source, for stream metadata.
    pub fn source(&self) -> &VideoSource {
        &self.source
    }
}

impl Iterator for Frames {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_frame().transpose()
    }
}

/// Open a video file as a frame iterator.
pub fn open_video(path: &Path) -> Result<Frames> {
    Ok(Frames::new(VideoSource::open(path)?))
}
