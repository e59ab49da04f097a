//! Browser capability traits.
//!
//! Lookups only talk to a browser through these two traits. The
//! [`chromium`] module provides the concrete engine; tests provide a
//! scripted page instead.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a page navigation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationResult {
    /// URL the page ended up on after redirects.
    pub final_url: String,
    /// Wall-clock time spent loading, in milliseconds.
    pub load_time_ms: u64,
}

/// A single open page (tab) in a browser session.
///
/// Element-level reads return `Ok(None)` when nothing matches the
/// selector; `Err` is reserved for protocol or script failures.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Load `url` and wait for the load event, failing after `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;

    /// Wait until an element matching `selector` exists.
    ///
    /// Returns `false` if the timeout elapsed first.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool>;

    /// Rendered text of the first element matching `selector`.
    async fn query_text(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute `name` of the first element matching `selector`.
    async fn query_attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Click the first element matching `selector`. Returns `false` when
    /// there was nothing to click.
    async fn click(&self, selector: &str) -> Result<bool>;

    /// Evaluate a script in the page and return its JSON value.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;

    /// Close the page. Safe to call after partial failures.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory for page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh page.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
}
