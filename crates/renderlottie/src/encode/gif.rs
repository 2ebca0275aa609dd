//! Two-stage GIF encoding.
//!
//! GIF alpha is one-bit, so semi-transparent edges from the capture would
//! come out as dark fringes. Stage one runs ImageMagick `convert` over the
//! captured sequence to threshold the alpha channel and resize to the final
//! width; stage two hands the softened sequence to `gifski` for palette
//! generation and assembly. The stages are strictly sequential.

use crate::config::GifOptions;
use crate::result::RenderResult;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::{resolve_program, run_stage, CONVERT_PATH_ENV, GIFSKI_PATH_ENV};

/// Alpha cutoff applied before palette generation
const ALPHA_THRESHOLD: &str = "90%";

/// convert argv for the softening stage, minus the program itself
fn soften_args(frames: &[PathBuf], width: u32, pattern: &Path) -> Vec<std::ffi::OsString> {
    let mut args: Vec<std::ffi::OsString> =
        frames.iter().map(|p| p.as_os_str().to_os_string()).collect();
    for flag in [
        "-channel",
        "A",
        "-threshold",
        ALPHA_THRESHOLD,
        "+channel",
        "-resize",
    ] {
        args.push(flag.into());
    }
    args.push(format!("{width}x").into());
    args.push("+adjoin".into());
    args.push(pattern.as_os_str().to_os_string());
    args
}

/// gifski argv for the assembly stage. A single softened frame is listed
/// twice (gifski needs at least two inputs).
fn assemble_args(
    softened: &[PathBuf],
    output: &Path,
    fps: f64,
    options: &GifOptions,
) -> Vec<std::ffi::OsString> {
    let mut args: Vec<std::ffi::OsString> = vec![
        "--fps".into(),
        format!("{}", fps.round() as u32).into(),
        "--quality".into(),
        options.quality.to_string().into(),
    ];
    if options.fast {
        args.push("--fast".into());
    }
    args.push("-o".into());
    args.push(output.as_os_str().to_os_string());

    args.extend(softened.iter().map(|p| p.as_os_str().to_os_string()));
    if softened.len() == 1 {
        args.extend(softened.iter().map(|p| p.as_os_str().to_os_string()));
    }
    args
}

/// A deferred GIF encode over a captured frame sequence
#[derive(Debug)]
pub struct GifEncodeJob<'a> {
    frames: &'a [PathBuf],
    work_dir: &'a Path,
    output: &'a Path,
    width: u32,
    fps: f64,
    options: &'a GifOptions,
}

impl<'a> GifEncodeJob<'a> {
    /// Set up an encode of `frames` into `output` at the final `width`,
    /// with scratch space under `work_dir`.
    #[must_use]
    pub fn new(
        frames: &'a [PathBuf],
        work_dir: &'a Path,
        output: &'a Path,
        width: u32,
        fps: f64,
        options: &'a GifOptions,
    ) -> Self {
        Self {
            frames,
            work_dir,
            output,
            width,
            fps,
            options,
        }
    }

    /// Run both stages to completion.
    ///
    /// # Errors
    ///
    /// Returns a spawn or encoder error from whichever stage fails; stage
    /// two never starts after a stage-one failure.
    pub async fn run(self) -> RenderResult<()> {
        let softened = self.soften_frames().await?;
        self.assemble_gif(&softened).await
    }

    /// Stage one: threshold alpha and resize every frame into a softened
    /// sequence under the scratch directory.
    async fn soften_frames(&self) -> RenderResult<Vec<PathBuf>> {
        let soft_dir = self.work_dir.join("softened");
        std::fs::create_dir_all(&soft_dir)?;

        let program = resolve_program(CONVERT_PATH_ENV, "convert");
        let mut command = Command::new(&program);
        command.args(soften_args(
            self.frames,
            self.width,
            &soft_dir.join("frame-%05d.png"),
        ));

        tracing::debug!(program, frames = self.frames.len(), "softening alpha for palette");
        run_stage(&program, &mut command).await?;

        Ok((0..self.frames.len())
            .map(|i| soft_dir.join(format!("frame-{i:05}.png")))
            .collect())
    }

    /// Stage two: assemble the softened sequence
    async fn assemble_gif(&self, softened: &[PathBuf]) -> RenderResult<()> {
        let program = resolve_program(GIFSKI_PATH_ENV, "gifski");
        let mut command = Command::new(&program);
        command.args(assemble_args(softened, self.output, self.fps, self.options));

        tracing::debug!(program, output = %self.output.display(), "assembling gif");
        run_stage(&program, &mut command).await
    }
}
