//! Animation data loading and metadata validation.
//!
//! The Bodymovin JSON carries the native frame rate, dimensions and name.
//! Those fields are validated here, before any browser is started; the
//! remaining metadata (duration, frame counts) is reported by the live
//! runtime once the host is ready.

use crate::config::RenderConfig;
use crate::result::{RenderError, RenderResult};
use serde::Deserialize;
use serde_json::Value;

/// Validated animation fields read straight from the JSON
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSummary {
    /// Native frame rate (`fr`)
    pub frame_rate: f64,
    /// Native width in pixels (`w`)
    pub width: u32,
    /// Native height in pixels (`h`)
    pub height: u32,
    /// Declared name (`nm`), empty when absent
    pub name: String,
}

/// Full metadata for a loaded animation, fixed once the host is ready
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationMetadata {
    /// Native frame rate
    pub frame_rate: f64,
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
    /// Declared name
    pub name: String,
    /// Duration in seconds, as reported by the runtime
    pub duration: f64,
    /// Total frame count, as reported by the runtime
    pub total_frames: u32,
    /// First playable frame index
    pub first_frame: u32,
}

/// Readiness payload resolved by the in-page bootstrap promise
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostReady {
    /// Duration in seconds
    pub duration: f64,
    /// Total frame count
    pub total_frames: f64,
    /// First playable frame index
    pub first_frame: f64,
}

impl AnimationSummary {
    /// Validate the animation JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Animation`] when the frame rate, width or
    /// height is missing or invalid. This fails fast, before any host work.
    pub fn from_json(data: &Value) -> RenderResult<Self> {
        let frame_rate = data
            .get("fr")
            .and_then(Value::as_f64)
            .filter(|fr| fr.is_finite() && *fr > 0.0)
            .ok_or_else(|| RenderError::animation("missing or invalid frame rate ('fr')"))?;

        let width = data
            .get("w")
            .and_then(Value::as_u64)
            .filter(|w| *w > 0)
            .ok_or_else(|| RenderError::animation("missing or invalid width ('w')"))?;

        let height = data
            .get("h")
            .and_then(Value::as_u64)
            .filter(|h| *h > 0)
            .ok_or_else(|| RenderError::animation("missing or invalid height ('h')"))?;

        let name = data
            .get("nm")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            frame_rate,
            width: width as u32,
            height: height as u32,
            name,
        })
    }

    /// Combine the JSON-derived fields with the runtime's readiness report
    #[must_use]
    pub fn into_metadata(self, ready: &HostReady) -> AnimationMetadata {
        AnimationMetadata {
            frame_rate: self.frame_rate,
            width: self.width,
            height: self.height,
            name: self.name,
            duration: ready.duration,
            total_frames: ready.total_frames as u32,
            first_frame: ready.first_frame as u32,
        }
    }
}

/// Load the animation JSON from the configured source.
///
/// # Errors
///
/// Propagates I/O and JSON parse failures; conflicting sources are already
/// rejected by [`RenderConfig::validate`].
pub fn load_animation(config: &RenderConfig) -> RenderResult<Value> {
    match (&config.animation_data, &config.animation_path) {
        (Some(data), None) => Ok(data.clone()),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        _ => Err(RenderError::config(
            "one of animation_data or animation_path is required",
        )),
    }
}

/// Resolve output dimensions from explicit options and the native aspect
/// ratio. A single explicit dimension derives the other from the aspect
/// ratio, truncated to whole pixels.
#[must_use]
pub fn resolve_dimensions(
    native_width: u32,
    native_height: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    let aspect = f64::from(native_width) / f64::from(native_height);
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (f64::from(w) / aspect) as u32),
        (None, Some(h)) => ((f64::from(h) * aspect) as u32, h),
        (None, None) => (native_width, native_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_from_valid_json() {
        let data = json!({"fr": 30, "w": 1820, "h": 275, "nm": "banner", "layers": []});
        let summary = AnimationSummary::from_json(&data).unwrap();
        assert!(summary.frame_rate == 30.0);
        assert_eq!(summary.width, 1820);
        assert_eq!(summary.height, 275);
        assert_eq!(summary.name, "banner");
    }

    #[test]
    fn test_summary_name_optional() {
        let data = json!({"fr": 24, "w": 10, "h": 10});
        let summary = AnimationSummary::from_json(&data).unwrap();
        assert!(summary.name.is_empty());
    }

    #[test]
    fn test_summary_rejects_malformed_metadata() {
        assert!(AnimationSummary::from_json(&json!({"w": 10, "h": 10})).is_err());
        assert!(AnimationSummary::from_json(&json!({"fr": 0, "w": 10, "h": 10})).is_err());
        assert!(AnimationSummary::from_json(&json!({"fr": 30, "h": 10})).is_err());
        assert!(AnimationSummary::from_json(&json!({"fr": 30, "w": 10, "h": 0})).is_err());
        assert!(AnimationSummary::from_json(&json!({"fr": 30, "w": "wide", "h": 10})).is_err());
    }

    #[test]
    fn test_into_metadata_merges_runtime_report() {
        let data = json!({"fr": 30, "w": 100, "h": 50, "nm": "logo"});
        let summary = AnimationSummary::from_json(&data).unwrap();
        let ready = HostReady {
            duration: 3.0,
            total_frames: 90.0,
            first_frame: 0.0,
        };
        let meta = summary.into_metadata(&ready);
        assert_eq!(meta.total_frames, 90);
        assert_eq!(meta.first_frame, 0);
        assert!(meta.duration == 3.0);
        assert_eq!(meta.name, "logo");
    }

    #[test]
    fn test_native_dimensions_pass_through() {
        assert_eq!(resolve_dimensions(1820, 275, None, None), (1820, 275));
    }

    #[test]
    fn test_height_derived_from_width() {
        // 640 / (1820/275) = 96.7 truncated
        assert_eq!(resolve_dimensions(1820, 275, Some(640), None), (640, 96));
    }

    #[test]
    fn test_width_derived_from_height() {
        // 100 * (1820/275) = 661.8 truncated
        assert_eq!(resolve_dimensions(1820, 275, None, Some(100)), (661, 100));
    }

    #[test]
    fn test_explicit_dimensions_win() {
        assert_eq!(
            resolve_dimensions(1820, 275, Some(640), Some(480)),
            (640, 480)
        );
    }

    #[test]
    fn test_load_inline_animation() {
        let config = RenderConfig::new("out.png")
            .with_animation_data(json!({"fr": 30, "w": 1, "h": 1}));
        let value = load_animation(&config).unwrap();
        assert_eq!(value["fr"], 30);
    }

    #[test]
    fn test_load_animation_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.json");
        std::fs::write(&path, r#"{"fr": 24, "w": 8, "h": 8}"#).unwrap();

        let config = RenderConfig::new("out.png").with_animation_path(&path);
        let value = load_animation(&config).unwrap();
        assert_eq!(value["fr"], 24);
    }

    #[test]
    fn test_load_animation_bad_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.json");
        std::fs::write(&path, "not json").unwrap();

        let config = RenderConfig::new("out.png").with_animation_path(&path);
        assert!(load_animation(&config).is_err());
    }
}
