//! End-to-end render orchestration.
//!
//! One invocation walks the whole path: validate the config, resolve the
//! output strategy and dimensions, stand up the capture page, wait for the
//! runtime's readiness signal, then drive the capture loop into whichever
//! sink the output path selected. Teardown always runs, even on failure:
//! the page is closed first, the browser only when this invocation launched
//! it, and only then does an error propagate.

use crate::animation::{load_animation, resolve_dimensions, AnimationSummary, HostReady};
use crate::browser::{Browser, Page};
use crate::capture::CaptureSession;
use crate::config::RenderConfig;
use crate::encode::{rescale_raster, GifEncodeJob, VideoEncodeJob};
use crate::harness;
use crate::output::OutputSpec;
use crate::resample::FramePlan;
use crate::result::RenderResult;
use std::path::PathBuf;

/// Summary of a completed render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStats {
    /// Frames captured (after resampling and the parity fix)
    pub frames: u32,
    /// Animation duration in seconds, as reported by the runtime
    pub duration: f64,
    /// Animation name, empty when the JSON declares none
    pub name: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Effective capture/encode frame rate
    pub fps: f64,
}

/// Everything resolvable without a browser. Config, output-format and
/// animation-metadata failures surface here, before any launch cost.
#[derive(Debug)]
struct Prepared {
    output_spec: OutputSpec,
    data: serde_json::Value,
    summary: AnimationSummary,
    width: u32,
    height: u32,
}

fn prepare(config: &RenderConfig) -> RenderResult<Prepared> {
    config.validate()?;
    let output_spec = OutputSpec::from_path(&config.output)?;
    let data = load_animation(config)?;
    let summary = AnimationSummary::from_json(&data)?;
    let (width, height) =
        resolve_dimensions(summary.width, summary.height, config.width, config.height);

    Ok(Prepared {
        output_spec,
        data,
        summary,
        width,
        height,
    })
}

/// Render an animation with a browser launched for this invocation.
///
/// # Errors
///
/// Propagates configuration, browser, capture and encoder failures. The
/// browser is always torn down before an error is returned.
pub async fn render(config: &RenderConfig) -> RenderResult<RenderStats> {
    let prepared = prepare(config)?;

    let browser = Browser::launch(config.chromium_path.as_deref()).await?;
    let result = render_on(config, &browser, prepared).await;
    let closed = browser.close().await;

    let stats = result?;
    closed?;
    Ok(stats)
}

/// Render an animation on a caller-supplied browser, amortizing launch cost
/// across invocations. The page created here is still torn down per
/// invocation; the browser is left running.
///
/// # Errors
///
/// Propagates configuration, browser, capture and encoder failures.
pub async fn render_with_browser(
    config: &RenderConfig,
    browser: &Browser,
) -> RenderResult<RenderStats> {
    let prepared = prepare(config)?;
    render_on(config, browser, prepared).await
}

async fn render_on(
    config: &RenderConfig,
    browser: &Browser,
    prepared: Prepared,
) -> RenderResult<RenderStats> {
    let Prepared {
        output_spec,
        data,
        summary,
        width,
        height,
    } = prepared;

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let page = browser
        .new_page(width, height, config.device_scale_factor)
        .await?;
    let result = drive_page(config, &output_spec, &data, summary, width, height, &page).await;
    let closed = page.close().await;

    let stats = result?;
    closed?;
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
async fn drive_page(
    config: &RenderConfig,
    output_spec: &OutputSpec,
    data: &serde_json::Value,
    summary: AnimationSummary,
    width: u32,
    height: u32,
    page: &Page,
) -> RenderResult<RenderStats> {
    page.set_content(&harness::build_page(config, width, height)?)
        .await?;
    let _installed: bool = page
        .evaluate(&harness::bootstrap_script(config, data))
        .await?;

    // Awaiting the expression awaits the promise; the runtime resolves it
    // exactly once, on DOMLoaded.
    let ready: HostReady = page.evaluate(harness::READY_EXPR).await?;
    let metadata = summary.into_metadata(&ready);

    let plan = FramePlan::new(
        metadata.frame_rate,
        config.renderer_settings.fps_scale,
        metadata.total_frames,
        metadata.first_frame,
    );

    if !config.quiet {
        tracing::info!(
            name = %metadata.name,
            frames = plan.retained_count(),
            fps = plan.fps,
            native_fps = plan.native_fps,
            width,
            height,
            "rendering animation"
        );
    }

    let mut session = CaptureSession::new(page, output_spec.capture_format(), config.jpeg_quality);

    let frames = match output_spec {
        OutputSpec::Still { .. } => {
            render_still(config, &mut session, &plan, width, height).await?
        }
        OutputSpec::Sequence { pattern, .. } => {
            let mut written = 0u32;
            for frame in plan.retained_frames() {
                let buffer = session.capture(frame).await?;
                // Numbered by animation frame index, so dropped frames leave
                // gaps in the sequence rather than compacting it.
                let path = pattern.frame_path(frame as usize);
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(&path, buffer)?;
                written += 1;
            }
            written
        }
        OutputSpec::Video => {
            let mut job =
                VideoEncodeJob::spawn(&config.output, width, height, plan.fps, &config.video)?;
            let mut written = 0u32;
            for frame in plan.retained_frames() {
                let buffer = session.capture(frame).await?;
                job.write_frame(&buffer).await?;
                written += 1;
            }
            job.finish().await?;
            written
        }
        OutputSpec::Gif => {
            let work_dir = tempfile::tempdir()?;
            let mut paths: Vec<PathBuf> = Vec::new();
            for frame in plan.retained_frames() {
                let buffer = session.capture(frame).await?;
                let path = work_dir.path().join(format!("frame-{:05}.png", paths.len()));
                std::fs::write(&path, buffer)?;
                paths.push(path);
            }
            GifEncodeJob::new(
                &paths,
                work_dir.path(),
                &config.output,
                width,
                plan.fps,
                &config.gif,
            )
            .run()
            .await?;
            paths.len() as u32
        }
    };

    if !config.quiet {
        tracing::info!(output = %config.output.display(), frames, "render complete");
    }

    Ok(RenderStats {
        frames,
        duration: metadata.duration,
        name: metadata.name,
        width,
        height,
        fps: plan.fps,
    })
}

/// Capture the first playable frame. A scaled capture surface produces a
/// buffer larger than the requested dimensions, so it lands in a temp file
/// and is rescaled down to logical size.
async fn render_still(
    config: &RenderConfig,
    session: &mut CaptureSession<'_>,
    plan: &FramePlan,
    width: u32,
    height: u32,
) -> RenderResult<u32> {
    let buffer = session.capture(plan.first_frame).await?;

    if config.device_scale_factor > 1 {
        let work_dir = tempfile::tempdir()?;
        let capture_path = work_dir
            .path()
            .join(format!("capture.{}", session.format().extension()));
        std::fs::write(&capture_path, buffer)?;
        rescale_raster(&capture_path, &config.output, width, height).await?;
    } else {
        std::fs::write(&config.output, buffer)?;
    }

    Ok(1)
}
