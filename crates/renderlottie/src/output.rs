//! Output format resolution.
//!
//! The output path extension selects the conversion strategy: single still
//! image, numbered image sequence, streaming video, or GIF. A still path
//! becomes a sequence when its file name carries a `%d`/`%0Nd` placeholder;
//! video outputs are always multi-frame regardless of placeholders.

use crate::result::{RenderError, RenderResult};
use std::path::{Path, PathBuf};

/// Raster format used for captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha
    Png,
    /// JPEG at configurable quality
    Jpeg,
}

impl ImageFormat {
    /// File extension without the dot
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// A `%d` / `%0Nd` numbered output pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePattern {
    prefix: String,
    suffix: String,
    pad: usize,
}

impl SequencePattern {
    /// Parse the first printf-style integer placeholder out of a path.
    ///
    /// Returns `None` when the path contains no placeholder.
    #[must_use]
    pub fn parse(path: &Path) -> Option<Self> {
        let text = path.to_string_lossy();
        let bytes = text.as_bytes();

        let mut i = 0;
        while let Some(offset) = text[i..].find('%') {
            let start = i + offset;
            let mut cursor = start + 1;
            let mut pad = 0usize;

            if cursor < bytes.len() && bytes[cursor] == b'0' {
                let digits_start = cursor + 1;
                let mut digits_end = digits_start;
                while digits_end < bytes.len() && bytes[digits_end].is_ascii_digit() {
                    digits_end += 1;
                }
                if digits_end > digits_start {
                    pad = text[digits_start..digits_end].parse().unwrap_or(0);
                    cursor = digits_end;
                }
            }

            if cursor < bytes.len() && bytes[cursor] == b'd' {
                return Some(Self {
                    prefix: text[..start].to_string(),
                    suffix: text[cursor + 1..].to_string(),
                    pad,
                });
            }

            i = start + 1;
        }

        None
    }

    /// Path for a given frame index
    #[must_use]
    pub fn frame_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!(
            "{}{:0pad$}{}",
            self.prefix,
            index,
            self.suffix,
            pad = self.pad
        ))
    }
}

/// Conversion strategy derived from the output path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSpec {
    /// One captured frame written to a single file
    Still {
        /// Capture format
        format: ImageFormat,
    },
    /// Every retained frame written to a numbered file
    Sequence {
        /// Capture format
        format: ImageFormat,
        /// Numbered pattern
        pattern: SequencePattern,
    },
    /// Frames streamed into a video encoder subprocess
    Video,
    /// Frames batched through the two-stage GIF pipeline
    Gif,
}

impl OutputSpec {
    /// Derive the output strategy from a path.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] for unsupported extensions.
    pub fn from_path(path: &Path) -> RenderResult<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "png" | "jpg" | "jpeg" => {
                let format = if extension == "png" {
                    ImageFormat::Png
                } else {
                    ImageFormat::Jpeg
                };
                match SequencePattern::parse(path) {
                    Some(pattern) => Ok(Self::Sequence { format, pattern }),
                    None => Ok(Self::Still { format }),
                }
            }
            "mp4" => Ok(Self::Video),
            "gif" => Ok(Self::Gif),
            "" => Err(RenderError::config(format!(
                "output path '{}' has no extension",
                path.display()
            ))),
            other => Err(RenderError::config(format!(
                "unsupported output format '.{other}' (png, jpg, jpeg, mp4, gif)"
            ))),
        }
    }

    /// Capture format for the whole session
    #[must_use]
    pub const fn capture_format(&self) -> ImageFormat {
        match self {
            Self::Still { format } | Self::Sequence { format, .. } => *format,
            // Encoders consume PNG frames (alpha required for GIF softening)
            Self::Video | Self::Gif => ImageFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_formats() {
        assert_eq!(
            OutputSpec::from_path(Path::new("out.png")).unwrap(),
            OutputSpec::Still {
                format: ImageFormat::Png
            }
        );
        assert_eq!(
            OutputSpec::from_path(Path::new("out.JPEG")).unwrap(),
            OutputSpec::Still {
                format: ImageFormat::Jpeg
            }
        );
    }

    #[test]
    fn test_video_and_gif() {
        assert_eq!(
            OutputSpec::from_path(Path::new("movie.mp4")).unwrap(),
            OutputSpec::Video
        );
        assert_eq!(
            OutputSpec::from_path(Path::new("anim.gif")).unwrap(),
            OutputSpec::Gif
        );
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(OutputSpec::from_path(Path::new("out.webm")).is_err());
        assert!(OutputSpec::from_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_sequence_detection() {
        let spec = OutputSpec::from_path(Path::new("frames/frame-%d.png")).unwrap();
        match spec {
            OutputSpec::Sequence { format, pattern } => {
                assert_eq!(format, ImageFormat::Png);
                assert_eq!(pattern.frame_path(7), PathBuf::from("frames/frame-7.png"));
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_padded_sequence_pattern() {
        let pattern = SequencePattern::parse(Path::new("out/f-%05d.jpg")).unwrap();
        assert_eq!(pattern.frame_path(42), PathBuf::from("out/f-00042.jpg"));
        assert_eq!(pattern.frame_path(123_456), PathBuf::from("out/f-123456.jpg"));
    }

    #[test]
    fn test_percent_without_placeholder_is_still() {
        assert!(SequencePattern::parse(Path::new("100%-done.png")).is_none());
        let spec = OutputSpec::from_path(Path::new("100%-done.png")).unwrap();
        assert!(matches!(spec, OutputSpec::Still { .. }));
    }

    #[test]
    fn test_video_pattern_still_video() {
        // Placeholders in a video path do not turn it into a sequence.
        let spec = OutputSpec::from_path(Path::new("clip-%d.mp4")).unwrap();
        assert_eq!(spec, OutputSpec::Video);
    }

    #[test]
    fn test_capture_format_for_encoders() {
        assert_eq!(OutputSpec::Video.capture_format(), ImageFormat::Png);
        assert_eq!(OutputSpec::Gif.capture_format(), ImageFormat::Png);
    }
}
