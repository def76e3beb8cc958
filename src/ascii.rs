//! Frame-to-text conversion.

use crate::decoder::RawFrame;

/// Character ramp ordered from sparsest to densest visual weight.
pub const ASCII_RAMP: &[u8; 10] = b" .:-=+*#%@";

/// Map a normalized brightness in [0, 1] onto the ramp.
pub fn ramp_char(brightness: f64) -> char {
    let last = ASCII_RAMP.len() - 1;
    let index = (brightness.clamp(0.0, 1.0) * last as f64) as usize;
    ASCII_RAMP[index.min(last)] as char
}

/// ITU-R BT.709 luma weighting, result in [0, 255].
fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

/// Converts raw RGB frames into fixed-width blocks of text.
#[derive(Debug, Clone, Copy)]
pub struct AsciiRenderer {
    width: u32,
}

impl AsciiRenderer {
    /// Create a renderer producing rows of `width` characters.
    pub fn new(width: u32) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// Output width in characters.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of text rows produced for a frame of the given pixel size.
    ///
    /// Character cells are roughly twice as tall as wide, so the row count
    /// is halved to preserve the frame's visual aspect ratio.
    pub fn target_height(&self, frame_width: u32, frame_height: u32) -> u32 {
        if frame_width == 0 {
            return 1;
        }
        let rows = self.width as f64 * frame_height as f64 / frame_width as f64 / 2.0;
        (rows.round() as u32).max(1)
    }

    /// Render one decoded frame into a newline-joined text block.
    pub fn render(&self, frame: &RawFrame) -> String {
        self.render_rgb(&frame.data, frame.width, frame.height)
    }

    /// Render packed RGB24 data into a newline-joined text block.
    ///
    /// The frame is resampled (nearest neighbour) to the target character
    /// grid, collapsed to a single brightness channel, and each sample is
    /// quantized onto the ramp. Rows carry no trailing newline.
    pub fn render_rgb(&self, data: &[u8], src_width: u32, src_height: u32) -> String {
        if src_width == 0 || src_height == 0 || data.is_empty() {
            return String::new();
        }

        let rows = self.target_height(src_width, src_height);
        let cols = self.width;
        let x_ratio = src_width as f64 / cols as f64;
        let y_ratio = src_height as f64 / rows as f64;

        let mut out = String::with_capacity((cols as usize + 1) * rows as usize);
        for y in 0..rows {
            if y > 0 {
                out.push('\n');
            }
            let src_y = ((y as f64 * y_ratio) as u32).min(src_height - 1);
            for x in 0..cols {
                let src_x = ((x as f64 * x_ratio) as u32).min(src_width - 1);
                let i = ((src_y * src_width + src_x) * 3) as usize;
                let brightness = if i + 2 < data.len() {
                    luma(data[i], data[i + 1], data[i + 2]) / 255.0
                } else {
                    0.0
                };
                out.push(ramp_char(brightness));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> RawFrame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&[r, g, b]);
        }
        RawFrame {
            data,
            width,
            height,
            index: 0,
        }
    }

    #[test]
    fn ramp_extremes() {
        assert_eq!(ramp_char(0.0), ' ');
        assert_eq!(ramp_char(1.0), '@');
        // Out-of-range input clamps instead of panicking.
        assert_eq!(ramp_char(-0.5), ' ');
        assert_eq!(ramp_char(2.0), '@');
    }

    #[test]
    fn ramp_is_monotone_in_brightness() {
        let density = |c: char| ASCII_RAMP.iter().position(|&b| b as char == c).unwrap();
        let mut last = 0;
        for step in 0..=100 {
            let current = density(ramp_char(step as f64 / 100.0));
            assert!(current >= last, "density dropped at step {}", step);
            last = current;
        }
        assert_eq!(last, ASCII_RAMP.len() - 1);
    }

    #[test]
    fn uniform_frame_uses_a_single_ramp_char() {
        let renderer = AsciiRenderer::new(8);
        for (value, expected) in [(0u8, ' '), (128, '='), (255, '@')] {
            let frame = solid_frame(16, 16, value, value, value);
            let text = renderer.render(&frame);
            assert!(!text.is_empty());
            for line in text.lines() {
                assert!(line.chars().all(|c| c == expected), "value {}", value);
            }
        }
    }

    #[test]
    fn output_dimensions_follow_the_aspect_formula() {
        // 10x10 source at width 4: round(4 * 10 / 10 / 2) = 2 rows.
        let renderer = AsciiRenderer::new(4);
        let text = renderer.render(&solid_frame(10, 10, 0, 0, 0));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() == 4));

        // 1920x1080 at width 80: round(80 * 1080 / 1920 / 2) = 23 rows.
        let renderer = AsciiRenderer::new(80);
        assert_eq!(renderer.target_height(1920, 1080), 23);
    }

    #[test]
    fn height_never_drops_below_one_row() {
        let renderer = AsciiRenderer::new(4);
        assert_eq!(renderer.target_height(100, 1), 1);
        let text = renderer.render(&solid_frame(100, 1, 255, 255, 255));
        assert_eq!(text, "@@@@");
    }

    #[test]
    fn empty_frame_renders_as_empty_string() {
        let renderer = AsciiRenderer::new(80);
        assert_eq!(renderer.render_rgb(&[], 0, 0), "");
    }

    #[test]
    fn black_gray_white_sequence_quantizes_to_ends_and_middle() {
        let renderer = AsciiRenderer::new(4);
        let frames = [
            (solid_frame(10, 10, 0, 0, 0), ' '),
            (solid_frame(10, 10, 128, 128, 128), '='),
            (solid_frame(10, 10, 255, 255, 255), '@'),
        ];
        for (frame, expected) in frames {
            let text = renderer.render(&frame);
            for line in text.lines() {
                assert_eq!(line, expected.to_string().repeat(4));
            }
        }
    }

    #[test]
    fn color_frames_collapse_through_luma() {
        let renderer = AsciiRenderer::new(4);
        // Pure green carries most of the luma weight, pure blue the least.
        let green = renderer.render(&solid_frame(10, 10, 0, 255, 0));
        let blue = renderer.render(&solid_frame(10, 10, 0, 0, 255));
        let density = |c: char| ASCII_RAMP.iter().position(|&b| b as char == c).unwrap();
        let first = |s: &str| s.chars().next().unwrap();
        assert!(density(first(&green)) > density(first(&blue)));
    }
}
