//! Renderlottie CLI: render Lottie animations from the command line
//!
//! ## Usage
//!
//! ```bash
//! renderlottie anim.json -o still.png             # First frame as PNG
//! renderlottie anim.json -o frames/f-%04d.png     # Numbered sequence
//! renderlottie anim.json -o clip.mp4 --width 640  # H.264 video
//! renderlottie anim.json -o loop.gif --gif-fast   # GIF
//! ```

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use renderlottie::{render, RenderConfig, Renderer, VideoPreset, VideoProfile};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Render a Lottie/Bodymovin animation to an image, sequence, video or GIF
#[derive(Debug, Parser)]
#[command(name = "renderlottie", version, about, long_about = None)]
struct Cli {
    /// Path to the animation JSON file
    input: PathBuf,

    /// Output path; the extension selects the format (png, jpg, mp4, gif).
    /// A `%d`/`%0Nd` placeholder in a png/jpg path writes a numbered sequence.
    #[arg(short, long)]
    output: PathBuf,

    /// Output width in pixels (height derived from aspect ratio if omitted)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (width derived from aspect ratio if omitted)
    #[arg(long)]
    height: Option<u32>,

    /// Rendering backend: svg, canvas or html
    #[arg(long, default_value = "svg")]
    renderer: Renderer,

    /// Frame rate multiplier (values below the 20fps floor fall back to native)
    #[arg(long, default_value_t = 1.0)]
    fps_scale: f64,

    /// Capture resolution multiplier
    #[arg(long, default_value_t = 1)]
    device_scale_factor: u32,

    /// JPEG quality (0-100), for jpg/jpeg outputs
    #[arg(long, default_value_t = renderlottie::config::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// x264 constant rate factor (0-51, lower is higher quality)
    #[arg(long, default_value_t = renderlottie::config::DEFAULT_CRF)]
    crf: u8,

    /// H.264 profile: baseline, main, high or high444
    #[arg(long, default_value = "main")]
    profile: VideoProfile,

    /// x264 preset: ultrafast, veryfast, fast, medium, slow or veryslow
    #[arg(long, default_value = "medium")]
    preset: VideoPreset,

    /// gifski quality (1-100)
    #[arg(long, default_value_t = renderlottie::config::DEFAULT_GIF_QUALITY)]
    gif_quality: u8,

    /// Trade GIF quality for encoding speed
    #[arg(long)]
    gif_fast: bool,

    /// Extra CSS applied to the animation container
    #[arg(long)]
    style: Option<String>,

    /// Raw markup appended to the page <head>
    #[arg(long)]
    inject_head: Option<String>,

    /// CSS appended to the page stylesheet
    #[arg(long)]
    inject_css: Option<String>,

    /// Raw markup appended to the page <body>
    #[arg(long)]
    inject_body: Option<String>,

    /// Explicit Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROMIUM_PATH")]
    chromium_path: Option<PathBuf>,

    /// Local lottie-web script to inline instead of the pinned CDN build
    #[arg(long, env = "LOTTIE_SCRIPT_PATH")]
    lottie_script: Option<PathBuf>,

    /// Suppress progress output (errors are still reported)
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> renderlottie::RenderResult<()> {
    let config = build_config(&cli);

    let spinner = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("rendering {}", cli.input.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = render(&config).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let stats = result?;
    if !cli.quiet {
        let label = if stats.name.is_empty() {
            cli.input.display().to_string()
        } else {
            stats.name.clone()
        };
        println!(
            "{label}: {frames} frame(s) -> {output} ({width}x{height} @ {fps} fps)",
            frames = stats.frames,
            output = cli.output.display(),
            width = stats.width,
            height = stats.height,
            fps = stats.fps,
        );
    }
    Ok(())
}

fn build_config(cli: &Cli) -> RenderConfig {
    let mut config = RenderConfig::new(&cli.output)
        .with_animation_path(&cli.input)
        .with_renderer(cli.renderer)
        .with_fps_scale(cli.fps_scale)
        .with_quiet(cli.quiet);

    config.width = cli.width;
    config.height = cli.height;
    config.device_scale_factor = cli.device_scale_factor;
    config.jpeg_quality = cli.jpeg_quality;
    config.video.crf = cli.crf;
    config.video.profile = cli.profile;
    config.video.preset = cli.preset;
    config.gif.quality = cli.gif_quality;
    config.gif.fast = cli.gif_fast;
    config.chromium_path = cli.chromium_path.clone();
    config.lottie_script = cli.lottie_script.clone();

    if let Some(style) = &cli.style {
        config.style = style.clone();
    }
    if let Some(head) = &cli.inject_head {
        config.inject.head = head.clone();
    }
    if let Some(css) = &cli.inject_css {
        config.inject.css = css.clone();
    }
    if let Some(body) = &cli.inject_body {
        config.inject.body = body.clone();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_minimal_invocation() {
        let cli = Cli::parse_from(["renderlottie", "anim.json", "-o", "out.png"]);
        assert_eq!(cli.input, PathBuf::from("anim.json"));
        assert_eq!(cli.output, PathBuf::from("out.png"));
        assert_eq!(cli.renderer, Renderer::Svg);
        assert!(cli.fps_scale == 1.0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_parses_encoder_options() {
        let cli = Cli::parse_from([
            "renderlottie",
            "anim.json",
            "-o",
            "clip.mp4",
            "--crf",
            "28",
            "--profile",
            "high",
            "--preset",
            "veryslow",
            "--width",
            "640",
        ]);
        assert_eq!(cli.crf, 28);
        assert_eq!(cli.profile, VideoProfile::High);
        assert_eq!(cli.preset, VideoPreset::Veryslow);
        assert_eq!(cli.width, Some(640));
    }

    #[test]
    fn test_build_config_carries_options() {
        let cli = Cli::parse_from([
            "renderlottie",
            "anim.json",
            "-o",
            "loop.gif",
            "--gif-quality",
            "60",
            "--gif-fast",
            "--quiet",
        ]);
        let config = build_config(&cli);
        assert_eq!(config.gif.quality, 60);
        assert!(config.gif.fast);
        assert!(config.quiet);
        assert_eq!(config.animation_path, Some(PathBuf::from("anim.json")));
    }
}
