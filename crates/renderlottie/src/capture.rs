//! Frame capture loop.
//!
//! The rendering surface holds exactly one animation state at a time, so the
//! session is strictly sequential: seek to a frame, hold it stopped, pull one
//! buffer, move on. Frames come back in increasing index order and are never
//! captured twice.

use crate::browser::Page;
use crate::harness;
use crate::output::ImageFormat;
use crate::result::{RenderError, RenderResult};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;

/// Live binding between a ready host page and the capture loop
#[derive(Debug)]
pub struct CaptureSession<'a> {
    page: &'a Page,
    format: ImageFormat,
    jpeg_quality: u8,
    cursor: Option<u32>,
}

impl<'a> CaptureSession<'a> {
    /// Bind a session to a ready page. The capture format is fixed for the
    /// whole session.
    #[must_use]
    pub fn new(page: &'a Page, format: ImageFormat, jpeg_quality: u8) -> Self {
        Self {
            page,
            format,
            jpeg_quality,
            cursor: None,
        }
    }

    /// Capture format for this session
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Seek the host to `frame`, hold it stopped, and capture the surface.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error for out-of-order requests or a failed
    /// seek, and a screenshot error for capture failures.
    pub async fn capture(&mut self, frame: u32) -> RenderResult<Vec<u8>> {
        if let Some(last) = self.cursor {
            if frame <= last {
                return Err(RenderError::evaluation(format!(
                    "frame {frame} requested after frame {last}; captures must be strictly increasing"
                )));
            }
        }

        let _seeked: bool = self.page.evaluate(&harness::seek_script(frame)).await?;

        let (format, quality) = match self.format {
            ImageFormat::Png => (CaptureScreenshotFormat::Png, None),
            ImageFormat::Jpeg => (CaptureScreenshotFormat::Jpeg, Some(self.jpeg_quality)),
        };
        let buffer = self.page.screenshot_surface(format, quality).await?;

        tracing::debug!(frame, bytes = buffer.len(), "captured frame");
        self.cursor = Some(frame);
        Ok(buffer)
    }
}
