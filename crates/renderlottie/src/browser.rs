//! Headless Chromium control over the Chrome DevTools Protocol.
//!
//! The animation host is an isolated page inside a chromiumoxide-driven
//! browser. A [`Browser`] may be launched per invocation or supplied by the
//! caller to amortize startup cost across renders; a [`Page`] is always
//! created per invocation and torn down by the pipeline.

use crate::result::{RenderError, RenderResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::dom::Rgba;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDefaultBackgroundColorOverrideParams, SetDeviceMetricsOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, Viewport,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A running Chromium instance
#[derive(Debug)]
pub struct Browser {
    inner: Arc<Mutex<CdpBrowser>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a headless browser.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Browser`] if the executable cannot be started.
    pub async fn launch(chromium_path: Option<&Path>) -> RenderResult<Self> {
        let mut builder = CdpConfig::builder().no_sandbox();

        if let Some(path) = chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(RenderError::browser)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| RenderError::browser(e.to_string()))?;

        // Drive the CDP message loop until the connection drops
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Create a blank page sized to the capture surface.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Page`] if the page cannot be created or sized.
    pub async fn new_page(
        &self,
        width: u32,
        height: u32,
        device_scale_factor: u32,
    ) -> RenderResult<Page> {
        let browser = self.inner.lock().await;
        let cdp_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::page(e.to_string()))?;
        drop(browser);

        let page = Page {
            width,
            height,
            inner: Arc::new(Mutex::new(cdp_page)),
        };
        page.configure_surface(device_scale_factor).await?;
        Ok(page)
    }

    /// Close the browser process
    pub async fn close(&self) -> RenderResult<()> {
        let mut browser = self.inner.lock().await;
        browser
            .close()
            .await
            .map_err(|e| RenderError::browser(e.to_string()))?;
        Ok(())
    }
}

/// A page hosting one animation capture surface
#[derive(Debug)]
pub struct Page {
    /// Surface width in CSS pixels
    pub width: u32,
    /// Surface height in CSS pixels
    pub height: u32,
    inner: Arc<Mutex<CdpPage>>,
}

impl Page {
    /// Viewport sizing plus a fully transparent default background, so PNG
    /// captures keep the animation's alpha channel.
    async fn configure_surface(&self, device_scale_factor: u32) -> RenderResult<()> {
        let page = self.inner.lock().await;

        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(self.width))
            .height(i64::from(self.height))
            .device_scale_factor(f64::from(device_scale_factor))
            .mobile(false)
            .build()
            .map_err(RenderError::page)?;
        page.execute(metrics)
            .await
            .map_err(|e| RenderError::page(e.to_string()))?;

        let transparent = Rgba::builder()
            .r(0)
            .g(0)
            .b(0)
            .a(0.0)
            .build()
            .map_err(RenderError::page)?;
        let background = SetDefaultBackgroundColorOverrideParams::builder()
            .color(transparent)
            .build();
        page.execute(background)
            .await
            .map_err(|e| RenderError::page(e.to_string()))?;

        Ok(())
    }

    /// Replace the page document with the harness markup.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Page`] if the content cannot be set.
    pub async fn set_content(&self, html: &str) -> RenderResult<()> {
        let page = self.inner.lock().await;
        page.set_content(html)
            .await
            .map_err(|e| RenderError::page(e.to_string()))?;
        Ok(())
    }

    /// Evaluate a script expression in the page and deserialize its value.
    /// Promise results are awaited, which is how one-shot readiness signals
    /// travel back to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Evaluation`] if evaluation or deserialization
    /// fails.
    pub async fn evaluate<T: serde::de::DeserializeOwned>(&self, expr: &str) -> RenderResult<T> {
        let page = self.inner.lock().await;
        let result = page
            .evaluate(expr)
            .await
            .map_err(|e| RenderError::evaluation(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| RenderError::evaluation(e.to_string()))
    }

    /// Capture the animation surface only (a clip at the page origin), not
    /// the full page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Screenshot`] on capture failure.
    pub async fn screenshot_surface(
        &self,
        format: CaptureScreenshotFormat,
        quality: Option<u8>,
    ) -> RenderResult<Vec<u8>> {
        let page = self.inner.lock().await;

        let mut builder = CaptureScreenshotParams::builder()
            .format(format)
            .clip(Viewport {
                x: 0.0,
                y: 0.0,
                width: f64::from(self.width),
                height: f64::from(self.height),
                scale: 1.0,
            })
            .from_surface(true);
        if let Some(quality) = quality {
            builder = builder.quality(i64::from(quality));
        }
        let params = builder.build();

        let screenshot = page
            .execute(params)
            .await
            .map_err(|e| RenderError::screenshot(e.to_string()))?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| RenderError::screenshot(e.to_string()))
    }

    /// Close the page, leaving the owning browser untouched
    pub async fn close(&self) -> RenderResult<()> {
        let page = self.inner.lock().await;
        page.clone()
            .close()
            .await
            .map_err(|e| RenderError::page(e.to_string()))?;
        Ok(())
    }
}
