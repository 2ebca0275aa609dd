//! Renderlottie: Headless Lottie Rendering and Encoding
//!
//! Renders Bodymovin/Lottie animation JSON inside a headless Chromium
//! instance driven over the Chrome DevTools Protocol and converts the
//! captured frames into a still image, a numbered image sequence, an H.264
//! video or a GIF.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Render Pipeline                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌───────────┐   ┌────────────┐   │
//! │  │ Animation│   │ Harness   │   │ Capture   │   │ Encoders   │   │
//! │  │ JSON     │──►│ page in   │──►│ loop      │──►│ ffmpeg /   │   │
//! │  │ (fr,w,h) │   │ Chromium  │   │ (CDP)     │   │ gifski     │   │
//! │  └──────────┘   └───────────┘   └───────────┘   └────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The entry points are [`render`] (launches a browser per invocation) and
//! [`render_with_browser`] (reuses a caller-supplied [`Browser`]).
//!
//! # Example
//!
//! ```no_run
//! use renderlottie::{render, RenderConfig};
//!
//! # async fn demo() -> renderlottie::RenderResult<()> {
//! let config = RenderConfig::new("out/banner.mp4")
//!     .with_animation_path("banner.json")
//!     .with_width(640);
//! let stats = render(&config).await?;
//! println!("rendered {} frames of '{}'", stats.frames, stats.name);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod animation;
pub mod browser;
pub mod capture;
pub mod config;
pub mod encode;
pub mod harness;
pub mod output;
pub mod pipeline;
pub mod resample;
pub mod result;

pub use animation::{AnimationMetadata, AnimationSummary};
pub use browser::{Browser, Page};
pub use capture::CaptureSession;
pub use config::{
    GifOptions, Inject, RenderConfig, Renderer, RendererSettings, VideoOptions, VideoPreset,
    VideoProfile,
};
pub use output::{ImageFormat, OutputSpec, SequencePattern};
pub use pipeline::{render, render_with_browser, RenderStats};
pub use resample::FramePlan;
pub use result::{RenderError, RenderResult};
