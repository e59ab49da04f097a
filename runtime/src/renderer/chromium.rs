//! Chromium renderer built on chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use crate::config::BrowserOptions;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Interval between DOM polls while waiting for a selector.
const POLL_INTERVAL_MS: u64 = 100;

/// A launched Chromium process plus its CDP event loop.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch Chromium with the given options.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();

        if let Some(path) = options.chromium_path.clone().or_else(find_chromium) {
            debug!("using chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser config: {e}"))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("launching chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("chromium handler event error: {e}");
                }
            }
        });

        info!(headless = options.headless, "chromium launched");
        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Close the browser and stop the event loop.
    pub async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await.context("closing chromium");
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("opening page")?;
        Ok(Box::new(ChromiumContext { page }))
    }
}

/// One Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await
            .map_err(|_| anyhow!("navigation to {url} timed out after {timeout_ms}ms"))?
            .with_context(|| format!("navigating to {url}"))?;

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            // Evaluation fails while a click-triggered navigation swaps the
            // document; keep polling until the deadline.
            if let Ok(value) = self.execute_js(&script).await {
                if value.as_bool() == Some(true) {
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                return el ? (el.innerText || el.textContent || '') : null;
            }})()"#,
            js_string(selector)
        );
        let value = self.execute_js(&script).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn query_attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                return el ? el.getAttribute({}) : null;
            }})()"#,
            js_string(selector),
            js_string(name)
        );
        let value = self.execute_js(&script).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (el) {{ el.click(); return true; }}
                return false;
            }})()"#,
            js_string(selector)
        );
        let value = self.execute_js(&script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("evaluating script")?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumContext { page } = *self;
        page.close().await.context("closing page")
    }
}

/// Quote `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Find a Chromium binary on `PATH` or in the usual install locations.
pub fn find_chromium() -> Option<PathBuf> {
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}
