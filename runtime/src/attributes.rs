//! Attribute extraction from the CNS11643 registry.
//!
//! The registry search URL either lands on a character's detail page or on a
//! list of candidates. List pages are resolved by following the first
//! detail link. Every field after that is read independently: a missing
//! element, a failed query, or an unmatched pattern leaves the field out of
//! the result and never stops the others.

use crate::config::{LookupConfig, REGISTRY_SEARCH_ID};
use crate::error::LookupError;
use crate::query::CodePoint;
use crate::renderer::RenderContext;
use anyhow::Result;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use url::Url;

pub const KEY_UNICODE: &str = "unicode";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_CHAR: &str = "char";
pub const KEY_CNS: &str = "cns";
pub const KEY_IDS: &str = "ids";
pub const KEY_COMPONENTS: &str = "components";
pub const KEY_STROKE_ORDER: &str = "stroke_order";

/// Present on every registry page once rendering is done.
const READY_SELECTOR: &str = "footer";
/// Only detail pages carry this figure.
const DETAIL_MARKER: &str = "figure[cnsCode]";
/// Result links on list pages.
const DETAIL_LINK: &str = "a[href*='wordView.jsp']";
const DESCRIPTION_META: &str = "meta[name='Description']";
const TITLE_SELECTOR: &str = "title";
const IDS_SELECTOR: &str = "figure[ids] div";
const COMPONENT_SELECTOR: &str = "figure[component]";
const STROKE_ORDER_SELECTOR: &str = "figure[strokeOrder]";

/// Attributes of one character, keyed by field name.
///
/// Keys keep the order they were first inserted in; inserting an existing
/// key replaces its value in place. Besides the named keys, the registry's
/// description contributes arbitrary `label: value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterAttributes {
    fields: Vec<(String, String)>,
}

impl CharacterAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn unicode(&self) -> Option<&str> {
        self.get(KEY_UNICODE)
    }

    pub fn description(&self) -> Option<&str> {
        self.get(KEY_DESCRIPTION)
    }

    /// The glyph the registry resolved the query to.
    pub fn character(&self) -> Option<&str> {
        self.get(KEY_CHAR)
    }

    pub fn cns(&self) -> Option<&str> {
        self.get(KEY_CNS)
    }

    pub fn ids(&self) -> Option<&str> {
        self.get(KEY_IDS)
    }

    pub fn components(&self) -> Option<&str> {
        self.get(KEY_COMPONENTS)
    }

    pub fn stroke_order(&self) -> Option<&str> {
        self.get(KEY_STROKE_ORDER)
    }
}

impl Serialize for CharacterAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Registry search URL for a code point.
pub fn registry_url(base: &str, code_point: &CodePoint) -> Result<Url, LookupError> {
    Url::parse_with_params(base, &[("ID", REGISTRY_SEARCH_ID), ("UNI", code_point.hex())])
        .map_err(|source| LookupError::InvalidUrl {
            url: base.to_string(),
            source,
        })
}

/// Merge the registry's meta description into `attrs`.
///
/// The description is a comma-separated list. Its first segment is the
/// glyph; every segment with a colon is a `label:value` pair. A label that
/// would clobber `unicode` is ignored.
pub fn apply_description(attrs: &mut CharacterAttributes, content: &str) {
    attrs.insert(KEY_DESCRIPTION, content);

    let parts: Vec<&str> = content.split(',').map(str::trim).collect();
    if let Some(first) = parts.first().filter(|p| !p.is_empty()) {
        attrs.insert(KEY_CHAR, *first);
    }

    for part in parts {
        let Some((label, value)) = part.split_once(':') else {
            continue;
        };
        let label = label.trim();
        if label.is_empty() || label == KEY_UNICODE {
            continue;
        }
        attrs.insert(label, value.trim());
    }
}

/// First `<plane>-<hex>` character-set code in `text`, e.g. `1-7A45`.
pub fn find_cns_code(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d+-[0-9A-F]+)").expect("cns regex is valid"));
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Look up attributes for `code_point` on an already-open page.
///
/// Fails only when the registry page cannot be loaded.
pub async fn extract(
    context: &mut dyn RenderContext,
    code_point: &CodePoint,
    config: &LookupConfig,
) -> Result<CharacterAttributes, LookupError> {
    let url = registry_url(&config.registry_url, code_point)?;
    info!(%code_point, %url, "querying registry");

    let nav = context
        .navigate(url.as_str(), config.registry_nav_timeout_ms)
        .await
        .map_err(|source| LookupError::Navigation {
            url: url.to_string(),
            source,
        })?;
    debug!(
        final_url = %nav.final_url,
        load_time_ms = nav.load_time_ms,
        "registry page loaded"
    );

    match context
        .wait_for_selector(READY_SELECTOR, config.ready_timeout_ms)
        .await
    {
        Ok(true) => {}
        Ok(false) => warn!(
            "registry page not ready after {}ms, extracting anyway",
            config.ready_timeout_ms
        ),
        Err(e) => warn!("waiting for registry page failed: {e:#}"),
    }

    resolve_detail_page(context, config).await;

    let mut attrs = CharacterAttributes::new();
    attrs.insert(KEY_UNICODE, code_point.to_string());

    match context.query_attribute(DESCRIPTION_META, "content").await {
        Ok(Some(content)) if !content.is_empty() => apply_description(&mut attrs, &content),
        Ok(_) => debug!("no description meta"),
        Err(e) => debug!("description: {e:#}"),
    }

    record(&mut attrs, KEY_CNS, extract_cns(context).await);
    record(&mut attrs, KEY_IDS, trimmed_text(context, IDS_SELECTOR).await);
    record(
        &mut attrs,
        KEY_COMPONENTS,
        trimmed_text(context, COMPONENT_SELECTOR).await,
    );
    record(
        &mut attrs,
        KEY_STROKE_ORDER,
        trimmed_text(context, STROKE_ORDER_SELECTOR).await,
    );

    info!(%code_point, fields = attrs.iter().count(), "registry lookup done");
    Ok(attrs)
}

/// Make sure we are on a detail page, following the first result link if
/// the search landed on a list. Any failure leaves the page as it is.
async fn resolve_detail_page(context: &dyn RenderContext, config: &LookupConfig) {
    match context
        .wait_for_selector(DETAIL_MARKER, config.detail_probe_timeout_ms)
        .await
    {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => debug!("detail marker probe: {e:#}"),
    }

    match context.click(DETAIL_LINK).await {
        Ok(true) => {
            debug!("list page, following first detail link");
            match context
                .wait_for_selector(DETAIL_MARKER, config.detail_timeout_ms)
                .await
            {
                Ok(true) => {}
                Ok(false) => warn!(
                    "detail page did not appear within {}ms",
                    config.detail_timeout_ms
                ),
                Err(e) => debug!("waiting for detail page: {e:#}"),
            }
        }
        Ok(false) => debug!("list page without detail links"),
        Err(e) => debug!("following detail link: {e:#}"),
    }
}

/// Code from the `cnsCode` figure, else from the page title.
async fn extract_cns(context: &dyn RenderContext) -> Result<Option<String>> {
    match context.query_text(DETAIL_MARKER).await {
        Ok(Some(text)) => {
            if let Some(code) = find_cns_code(&text) {
                return Ok(Some(code));
            }
        }
        Ok(None) => {}
        Err(e) => debug!("cns figure: {e:#}"),
    }

    let title = context.query_text(TITLE_SELECTOR).await?;
    Ok(title.as_deref().and_then(find_cns_code))
}

async fn trimmed_text(context: &dyn RenderContext, selector: &str) -> Result<Option<String>> {
    let text = context.query_text(selector).await?;
    Ok(text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}

/// Keep a successfully extracted field; log and drop anything else.
fn record(attrs: &mut CharacterAttributes, key: &str, value: Result<Option<String>>) {
    match value {
        Ok(Some(v)) => attrs.insert(key, v),
        Ok(None) => debug!("{key}: not found"),
        Err(e) => debug!("{key}: {e:#}"),
    }
}
