//! Streaming H.264 video encoding.
//!
//! The video job is started before the first frame is captured; PNG frames
//! are streamed straight into ffmpeg's stdin so no frame sequence touches
//! disk. ffmpeg may close its end of the pipe early once it has read enough
//! input, so writes tolerate a broken pipe and the exit status decides.

use crate::config::VideoOptions;
use crate::result::{RenderError, RenderResult};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

use super::{even_scale_filter, resolve_program, FFMPEG_PATH_ENV};

/// A running ffmpeg process consuming PNG frames on stdin
#[derive(Debug)]
pub struct VideoEncodeJob {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
}

/// ffmpeg argv for a streaming encode, minus the program itself
fn encode_args(
    output: &Path,
    width: u32,
    height: u32,
    fps: f64,
    options: &VideoOptions,
) -> Vec<std::ffi::OsString> {
    let scale = even_scale_filter(width, height);
    let mut args: Vec<std::ffi::OsString> = [
        "-v",
        "error",
        "-f",
        "image2pipe",
        "-c:v",
        "png",
        "-r",
        &fps.to_string(),
        "-i",
        "-",
        "-vf",
        &scale,
        "-c:v",
        "libx264",
        "-profile:v",
        options.profile.as_str(),
        "-preset",
        options.preset.as_str(),
        "-crf",
        &options.crf.to_string(),
        "-movflags",
        "+faststart",
        "-pix_fmt",
        "yuv420p",
        "-an",
        "-y",
    ]
    .into_iter()
    .map(Into::into)
    .collect();
    args.push(output.as_os_str().to_os_string());
    args
}

impl VideoEncodeJob {
    /// Spawn the encoder for `output`, sized to the capture surface and
    /// timed at the effective frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Spawn`] if the binary cannot be started.
    pub fn spawn(
        output: &Path,
        width: u32,
        height: u32,
        fps: f64,
        options: &VideoOptions,
    ) -> RenderResult<Self> {
        let program = resolve_program(FFMPEG_PATH_ENV, "ffmpeg");

        let mut child = Command::new(&program)
            .args(encode_args(output, width, height, fps, options))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        tracing::debug!(program, output = %output.display(), fps, "video encoder started");

        Ok(Self {
            program,
            child,
            stdin,
        })
    }

    /// Stream one encoded PNG frame into the encoder. A broken pipe is not
    /// an error here: the encoder has stopped reading and its exit status
    /// will tell the real story in [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Propagates I/O failures other than a closed pipe.
    pub async fn write_frame(&mut self, frame: &[u8]) -> RenderResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(());
        };

        match stdin.write_all(frame).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("encoder closed its input early");
                self.stdin = None;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Signal end of input and wait for the encoder to finish.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encoder`] with captured stderr when the
    /// process exits non-zero.
    pub async fn finish(mut self) -> RenderResult<()> {
        // Closing stdin is the end-of-stream signal
        drop(self.stdin.take());

        let output = self.child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            if !stderr.trim().is_empty() {
                tracing::debug!(program = %self.program, stderr = %stderr.trim(), "encoder diagnostics");
            }
            Ok(())
        } else {
            Err(RenderError::Encoder {
                program: self.program,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}
