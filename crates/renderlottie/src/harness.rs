//! Capture page construction.
//!
//! Builds the HTML document hosting the lottie-web runtime and the scripts
//! evaluated against it: the bootstrap call that loads the animation paused,
//! the one-shot readiness promise, and the per-frame seek expression.

use crate::config::RenderConfig;
use crate::result::RenderResult;
use serde_json::Value;
use std::path::Path;

/// Pinned lottie-web build used when no local script is configured
pub const LOTTIE_CDN_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/bodymovin/5.12.2/lottie.min.js";

/// Environment override for a local lottie-web script
pub const LOTTIE_SCRIPT_ENV: &str = "LOTTIE_SCRIPT_PATH";

/// Expression resolving to the readiness payload; the promise is created by
/// [`bootstrap_script`] and resolved exactly once on the runtime's
/// `DOMLoaded` event.
pub const READY_EXPR: &str = "window.__lottieReady";

/// Resolve the `<script>` tag for the lottie-web runtime: explicit path,
/// then the `LOTTIE_SCRIPT_PATH` environment variable, then the pinned CDN.
fn lottie_script_tag(explicit: Option<&Path>) -> RenderResult<String> {
    let env_path = std::env::var(LOTTIE_SCRIPT_ENV).ok();
    let local = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_path.map(Into::into));

    match local {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            Ok(format!("<script>{source}</script>"))
        }
        None => Ok(format!(r#"<script src="{LOTTIE_CDN_URL}"></script>"#)),
    }
}

/// Build the harness document: a transparent page with a single fixed
/// `#lottie` container sized to the capture surface, plus the caller's
/// injected head/style/body payloads.
///
/// # Errors
///
/// Fails only when a configured local lottie-web script cannot be read.
pub fn build_page(config: &RenderConfig, width: u32, height: u32) -> RenderResult<String> {
    let script_tag = lottie_script_tag(config.lottie_script.as_deref())?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
{script_tag}
<style>
* {{ margin: 0; padding: 0; }}
html, body {{ background: transparent; overflow: hidden; }}
#lottie {{
  position: fixed;
  top: 0;
  left: 0;
  width: {width}px;
  height: {height}px;
  overflow: hidden;
  {style}
}}
{inject_css}
</style>
{inject_head}
</head>
<body>
<div id="lottie"></div>
{inject_body}
</body>
</html>"#,
        style = config.style,
        inject_css = config.inject.css,
        inject_head = config.inject.head,
        inject_body = config.inject.body,
    ))
}

/// Script that loads the animation into the page runtime, paused and
/// non-autoplaying, and installs the one-shot readiness promise.
#[must_use]
pub fn bootstrap_script(config: &RenderConfig, animation_data: &Value) -> String {
    let renderer = config.renderer.as_str();
    let settings = Value::Object(config.renderer_settings.extra.clone());

    format!(
        r#"(() => {{
  window.__lottieReady = new Promise((resolve, reject) => {{
    try {{
      const anim = lottie.loadAnimation({{
        container: document.getElementById('lottie'),
        renderer: '{renderer}',
        loop: false,
        autoplay: false,
        rendererSettings: {settings},
        animationData: {animation_data},
      }});
      window.__anim = anim;
      anim.addEventListener('DOMLoaded', () => resolve({{
        duration: anim.getDuration(),
        totalFrames: anim.totalFrames,
        firstFrame: anim.firstFrame,
      }}));
    }} catch (err) {{
      reject(err);
    }}
  }});
  return true;
}})()"#
    )
}

/// Expression seeking the runtime to an exact frame and holding it stopped
#[must_use]
pub fn seek_script(frame: u32) -> String {
    format!("(() => {{ window.__anim.goToAndStop({frame}, true); return true; }})()")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> RenderConfig {
        RenderConfig::new("out.png").with_animation_data(json!({"fr": 30, "w": 10, "h": 10}))
    }

    #[test]
    fn test_page_contains_sized_container() {
        let html = build_page(&config(), 640, 96).unwrap();
        assert!(html.contains("width: 640px"));
        assert!(html.contains("height: 96px"));
        assert!(html.contains(r#"<div id="lottie"></div>"#));
        assert!(html.contains("background: transparent"));
    }

    #[test]
    fn test_page_defaults_to_cdn_script() {
        let html = build_page(&config(), 10, 10).unwrap();
        assert!(html.contains(LOTTIE_CDN_URL));
    }

    #[test]
    fn test_page_inlines_local_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lottie.min.js");
        std::fs::write(&path, "var lottie = {};").unwrap();

        let mut cfg = config();
        cfg.lottie_script = Some(path);
        let html = build_page(&cfg, 10, 10).unwrap();
        assert!(html.contains("<script>var lottie = {};</script>"));
        assert!(!html.contains(LOTTIE_CDN_URL));
    }

    #[test]
    fn test_page_merges_injected_payloads() {
        let mut cfg = config();
        cfg.style = "background: #fff;".to_string();
        cfg.inject.head = "<meta name=\"robots\" content=\"none\">".to_string();
        cfg.inject.css = ".extra { color: red; }".to_string();
        cfg.inject.body = "<span id=\"marker\"></span>".to_string();

        let html = build_page(&cfg, 10, 10).unwrap();
        assert!(html.contains("background: #fff;"));
        assert!(html.contains("robots"));
        assert!(html.contains(".extra { color: red; }"));
        assert!(html.contains("id=\"marker\""));
    }

    #[test]
    fn test_bootstrap_script_loads_paused() {
        let data = json!({"fr": 30, "w": 10, "h": 10, "nm": "x"});
        let script = bootstrap_script(&config(), &data);
        assert!(script.contains("autoplay: false"));
        assert!(script.contains("loop: false"));
        assert!(script.contains("renderer: 'svg'"));
        assert!(script.contains("\"nm\":\"x\""));
        assert!(script.contains("DOMLoaded"));
    }

    #[test]
    fn test_bootstrap_script_forwards_renderer_settings() {
        let mut cfg = config();
        cfg.renderer_settings
            .extra
            .insert("preserveAspectRatio".to_string(), json!("xMidYMid slice"));
        let script = bootstrap_script(&cfg, &json!({}));
        assert!(script.contains("xMidYMid slice"));
    }

    #[test]
    fn test_seek_script_targets_exact_frame() {
        let script = seek_script(42);
        assert!(script.contains("goToAndStop(42, true)"));
    }
}
