//! Encoder subprocess pipelines.
//!
//! Captured frames leave the process through external encoder binaries:
//! ffmpeg for streaming video and raster rescaling, ImageMagick `convert`
//! plus `gifski` for the two-stage GIF path. This module owns every child
//! process handle; a non-zero exit status is always a fatal encoding error
//! and stderr is carried into the error for diagnostics.

mod gif;
mod video;

pub use gif::GifEncodeJob;
pub use video::VideoEncodeJob;

use crate::result::{RenderError, RenderResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Environment override for the ffmpeg binary
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Environment override for the ImageMagick convert binary
pub const CONVERT_PATH_ENV: &str = "CONVERT_PATH";

/// Environment override for the gifski binary
pub const GIFSKI_PATH_ENV: &str = "GIFSKI_PATH";

/// Resolve an encoder binary from its environment override
pub(crate) fn resolve_program(env_key: &str, default: &str) -> String {
    std::env::var(env_key).unwrap_or_else(|_| default.to_string())
}

/// ffmpeg scale filter that never requests odd encoder dimensions: an even
/// width pivots on width, an odd width pivots on an even height, and if both
/// are odd the width is padded by one pixel.
#[must_use]
pub fn even_scale_filter(width: u32, height: u32) -> String {
    if width % 2 == 0 {
        format!("scale={width}:-2")
    } else if height % 2 == 0 {
        format!("scale=-2:{height}")
    } else {
        format!("scale={}:-2", width + 1)
    }
}

/// Run a file-based encoder stage to completion and check its exit status.
pub(crate) async fn run_stage(program: &str, command: &mut Command) -> RenderResult<()> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RenderError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = child.wait_with_output().await?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        if !stderr.trim().is_empty() {
            tracing::debug!(program, stderr = %stderr.trim(), "encoder diagnostics");
        }
        Ok(())
    } else {
        Err(RenderError::Encoder {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

/// Rescale a temporary raster capture to the requested dimensions. Used when
/// the capture landed in the temp directory (scaled capture) and the final
/// output is a plain still image.
///
/// # Errors
///
/// Returns [`RenderError::Spawn`] or [`RenderError::Encoder`] on subprocess
/// failure.
pub async fn rescale_raster(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
) -> RenderResult<()> {
    let program = resolve_program(FFMPEG_PATH_ENV, "ffmpeg");
    let mut command = Command::new(&program);
    command
        .arg("-v")
        .arg("error")
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(format!("scale={width}:{height}"))
        .arg("-y")
        .arg(output);
    run_stage(&program, &mut command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_width_pivots_on_width() {
        assert_eq!(even_scale_filter(1820, 275), "scale=1820:-2");
        assert_eq!(even_scale_filter(640, 96), "scale=640:-2");
    }

    #[test]
    fn test_odd_width_pivots_on_even_height() {
        assert_eq!(even_scale_filter(661, 100), "scale=-2:100");
    }

    #[test]
    fn test_both_odd_pads_width() {
        assert_eq!(even_scale_filter(333, 275), "scale=334:-2");
    }

    #[test]
    fn test_resolve_program_default() {
        assert_eq!(
            resolve_program("RENDERLOTTIE_TEST_UNSET_BINARY", "ffmpeg"),
            "ffmpeg"
        );
    }
}
