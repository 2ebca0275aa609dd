//! Render configuration surface.
//!
//! Mirrors the option set accepted by [`crate::render`]: animation source,
//! output sizing, renderer selection, per-format encoder options, and the
//! payloads injected into the capture page.

use crate::result::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Default JPEG quality for still/sequence outputs
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default x264 constant rate factor (lower = higher quality)
pub const DEFAULT_CRF: u8 = 20;

/// Default gifski quality (1-100)
pub const DEFAULT_GIF_QUALITY: u8 = 80;

/// Rendering backend exposed by the lottie-web runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// SVG renderer (default; best fidelity for masks and effects)
    #[default]
    Svg,
    /// Canvas renderer
    Canvas,
    /// HTML renderer
    Html,
}

impl Renderer {
    /// Name passed to `lottie.loadAnimation`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Canvas => "canvas",
            Self::Html => "html",
        }
    }
}

impl FromStr for Renderer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(Self::Svg),
            "canvas" => Ok(Self::Canvas),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown renderer '{other}' (svg, canvas, html)")),
        }
    }
}

impl std::fmt::Display for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings forwarded to the in-page renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererSettings {
    /// Frame rate multiplier applied before the 20fps floor rule
    pub fps_scale: f64,
    /// Opaque extra settings passed through to `lottie.loadAnimation`
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            fps_scale: 1.0,
            extra: serde_json::Map::new(),
        }
    }
}

/// H.264 profile (fixed enumeration accepted by libx264)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProfile {
    /// Baseline profile
    Baseline,
    /// Main profile (default)
    #[default]
    Main,
    /// High profile
    High,
    /// High 4:4:4 predictive profile
    High444,
}

impl VideoProfile {
    /// Value for ffmpeg's `-profile:v`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Main => "main",
            Self::High => "high",
            Self::High444 => "high444",
        }
    }
}

impl FromStr for VideoProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(Self::Baseline),
            "main" => Ok(Self::Main),
            "high" => Ok(Self::High),
            "high444" => Ok(Self::High444),
            other => Err(format!(
                "unknown profile '{other}' (baseline, main, high, high444)"
            )),
        }
    }
}

impl std::fmt::Display for VideoProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// x264 encoding speed/compression preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPreset {
    /// Fastest encode, largest output
    Ultrafast,
    /// Very fast
    Veryfast,
    /// Fast
    Fast,
    /// Balanced (default)
    #[default]
    Medium,
    /// Slow
    Slow,
    /// Slowest encode, best compression
    Veryslow,
}

impl VideoPreset {
    /// Value for ffmpeg's `-preset`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Veryfast => "veryfast",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Veryslow => "veryslow",
        }
    }
}

impl FromStr for VideoPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ultrafast" => Ok(Self::Ultrafast),
            "veryfast" => Ok(Self::Veryfast),
            "fast" => Ok(Self::Fast),
            "medium" => Ok(Self::Medium),
            "slow" => Ok(Self::Slow),
            "veryslow" => Ok(Self::Veryslow),
            other => Err(format!(
                "unknown preset '{other}' (ultrafast, veryfast, fast, medium, slow, veryslow)"
            )),
        }
    }
}

impl std::fmt::Display for VideoPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video encoder options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOptions {
    /// Constant rate factor, 0-51 (lower = higher quality)
    pub crf: u8,
    /// H.264 profile
    pub profile: VideoProfile,
    /// Encoding preset
    pub preset: VideoPreset,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            crf: DEFAULT_CRF,
            profile: VideoProfile::default(),
            preset: VideoPreset::default(),
        }
    }
}

/// GIF encoder options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GifOptions {
    /// gifski quality, 1-100
    pub quality: u8,
    /// Trade quality for encoding speed
    pub fast: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_GIF_QUALITY,
            fast: false,
        }
    }
}

/// Opaque content merged into the capture page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inject {
    /// Raw markup appended to `<head>`
    pub head: String,
    /// CSS appended to the harness stylesheet
    pub css: String,
    /// Raw markup appended to `<body>` after the animation container
    pub body: String,
}

impl Inject {
    /// True when nothing is injected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.css.is_empty() && self.body.is_empty()
    }
}

/// Configuration for one render invocation
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Inline animation data (exactly one of this or `animation_path`)
    pub animation_data: Option<serde_json::Value>,
    /// Path to an animation JSON file (exactly one of this or `animation_data`)
    pub animation_path: Option<PathBuf>,
    /// Output path or sequence pattern; the extension selects the format
    pub output: PathBuf,
    /// Explicit output width (height derived from aspect ratio if absent)
    pub width: Option<u32>,
    /// Explicit output height (width derived from aspect ratio if absent)
    pub height: Option<u32>,
    /// Capture resolution multiplier (positive integer)
    pub device_scale_factor: u32,
    /// Rendering backend
    pub renderer: Renderer,
    /// Renderer settings, including the fps-scale multiplier
    pub renderer_settings: RendererSettings,
    /// JPEG quality 0-100; applies only to JPEG still/sequence outputs
    pub jpeg_quality: u8,
    /// Video encoder options
    pub video: VideoOptions,
    /// GIF encoder options
    pub gif: GifOptions,
    /// Extra CSS applied to the animation container
    pub style: String,
    /// Head/CSS/body payloads merged into the page
    pub inject: Inject,
    /// Suppress progress reporting (never suppresses errors)
    pub quiet: bool,
    /// Explicit Chromium executable (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Explicit lottie-web script source (None = `LOTTIE_SCRIPT_PATH` env or CDN)
    pub lottie_script: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            animation_data: None,
            animation_path: None,
            output: PathBuf::new(),
            width: None,
            height: None,
            device_scale_factor: 1,
            renderer: Renderer::default(),
            renderer_settings: RendererSettings::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            video: VideoOptions::default(),
            gif: GifOptions::default(),
            style: String::new(),
            inject: Inject::default(),
            quiet: false,
            chromium_path: None,
            lottie_script: None,
        }
    }
}

impl RenderConfig {
    /// Create a config for the given output path
    #[must_use]
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Set inline animation data
    #[must_use]
    pub fn with_animation_data(mut self, data: serde_json::Value) -> Self {
        self.animation_data = Some(data);
        self
    }

    /// Set the animation file path
    #[must_use]
    pub fn with_animation_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.animation_path = Some(path.into());
        self
    }

    /// Set explicit output width
    #[must_use]
    pub const fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set explicit output height
    #[must_use]
    pub const fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the rendering backend
    #[must_use]
    pub const fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the fps-scale multiplier
    #[must_use]
    pub fn with_fps_scale(mut self, fps_scale: f64) -> Self {
        self.renderer_settings.fps_scale = fps_scale;
        self
    }

    /// Set quiet mode
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Validate option combinations before any browser or subprocess work.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] on conflicting or out-of-range options.
    pub fn validate(&self) -> RenderResult<()> {
        match (&self.animation_data, &self.animation_path) {
            (Some(_), Some(_)) => {
                return Err(RenderError::config(
                    "animation_data and animation_path are mutually exclusive",
                ))
            }
            (None, None) => {
                return Err(RenderError::config(
                    "one of animation_data or animation_path is required",
                ))
            }
            _ => {}
        }

        if self.output.as_os_str().is_empty() {
            return Err(RenderError::config("output path is required"));
        }

        if self.device_scale_factor == 0 {
            return Err(RenderError::config(
                "device_scale_factor must be a positive integer",
            ));
        }

        if self.jpeg_quality > 100 {
            return Err(RenderError::config("jpeg_quality must be within 0-100"));
        }

        if self.video.crf > 51 {
            return Err(RenderError::config("video crf must be within 0-51"));
        }

        if self.gif.quality == 0 || self.gif.quality > 100 {
            return Err(RenderError::config("gif quality must be within 1-100"));
        }

        if !(self.renderer_settings.fps_scale.is_finite() && self.renderer_settings.fps_scale > 0.0)
        {
            return Err(RenderError::config("fps_scale must be a positive number"));
        }

        if self.width == Some(0) || self.height == Some(0) {
            return Err(RenderError::config("width/height must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_config() -> RenderConfig {
        RenderConfig::new("out.png").with_animation_data(json!({"fr": 30, "w": 100, "h": 100}))
    }

    #[test]
    fn test_exactly_one_source_required() {
        let neither = RenderConfig::new("out.png");
        assert!(neither.validate().is_err());

        let both = valid_config().with_animation_path("anim.json");
        assert!(both.validate().is_err());

        assert!(valid_config().validate().is_ok());

        let path_only = RenderConfig::new("out.png").with_animation_path("anim.json");
        assert!(path_only.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_options() {
        let mut config = valid_config();
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.video.crf = 52;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.device_scale_factor = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.renderer_settings.fps_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.width = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_renderer_round_trip() {
        for name in ["svg", "canvas", "html"] {
            let renderer: Renderer = name.parse().unwrap();
            assert_eq!(renderer.to_string(), name);
        }
        assert!("webgl".parse::<Renderer>().is_err());
    }

    #[test]
    fn test_video_option_parsing() {
        assert_eq!("main".parse::<VideoProfile>().unwrap(), VideoProfile::Main);
        assert_eq!(
            "veryslow".parse::<VideoPreset>().unwrap(),
            VideoPreset::Veryslow
        );
        assert!("turbo".parse::<VideoPreset>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(config.video.crf, DEFAULT_CRF);
        assert_eq!(config.device_scale_factor, 1);
        assert_eq!(config.renderer, Renderer::Svg);
        assert!(config.renderer_settings.fps_scale == 1.0);
        assert!(config.inject.is_empty());
    }
}
