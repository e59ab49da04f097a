//! Scripted fake browser for lookup tests.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tc_unicode::renderer::{NavigationResult, RenderContext, Renderer};

/// One rendered page: which selectors exist and what they hold.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    links: HashMap<String, String>,
    failing: HashSet<String>,
    script_result: serde_json::Value,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element matching `selector` with the given rendered text.
    pub fn element(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    /// Clicking `selector` loads `target`.
    pub fn link(mut self, selector: &str, target: &str) -> Self {
        self.links.insert(selector.to_string(), target.to_string());
        self
    }

    /// Every read of `selector` fails, as when the page goes away mid-query.
    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }

    /// Value every script evaluation returns.
    pub fn script_result(mut self, value: serde_json::Value) -> Self {
        self.script_result = value;
        self
    }

    fn has(&self, selector: &str) -> bool {
        self.texts.contains_key(selector)
            || self.links.contains_key(selector)
            || self.attributes.keys().any(|(s, _)| s == selector)
    }
}

/// Counters shared by a renderer and every context it hands out.
#[derive(Debug, Default)]
pub struct Stats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl Stats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

/// Serves [`FakePage`]s by URL. Unknown URLs fail to load.
#[derive(Default)]
pub struct FakeRenderer {
    pages: HashMap<String, FakePage>,
    fail_launch: bool,
    pub stats: Arc<Stats>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// A renderer that cannot open pages at all.
    pub fn broken() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        if self.fail_launch {
            bail!("browser crashed on startup");
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            pages: self.pages.clone(),
            current: Mutex::new(None),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeContext {
    pages: HashMap<String, FakePage>,
    current: Mutex<Option<(String, FakePage)>>,
    stats: Arc<Stats>,
}

impl FakeContext {
    fn with_page<T>(&self, f: impl FnOnce(&FakePage) -> T) -> Result<T> {
        let current = self.current.lock().unwrap();
        let (_, page) = current.as_ref().ok_or_else(|| anyhow!("no page loaded"))?;
        Ok(f(page))
    }

    /// Like [`Self::with_page`], but fails for selectors marked failing.
    fn read<T>(&self, selector: &str, f: impl FnOnce(&FakePage) -> T) -> Result<T> {
        self.with_page(|p| {
            if p.failing.contains(selector) {
                Err(anyhow!("Execution context was destroyed while reading {selector}"))
            } else {
                Ok(f(p))
            }
        })?
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.stats.navigations.lock().unwrap().push(url.to_string());
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        *self.current.lock().unwrap() = Some((url.to_string(), page));
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> Result<bool> {
        self.read(selector, |p| p.has(selector))
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>> {
        self.read(selector, |p| p.texts.get(selector).cloned())
    }

    async fn query_attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.read(selector, |p| {
            p.attributes
                .get(&(selector.to_string(), name.to_string()))
                .cloned()
        })
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let target = self.with_page(|p| p.links.get(selector).cloned())?;
        let Some(target) = target else {
            return Ok(false);
        };
        let page = self
            .pages
            .get(&target)
            .cloned()
            .ok_or_else(|| anyhow!("link target {target} not found"))?;
        self.stats.navigations.lock().unwrap().push(target.clone());
        *self.current.lock().unwrap() = Some((target, page));
        Ok(true)
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        self.with_page(|p| p.script_result.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
