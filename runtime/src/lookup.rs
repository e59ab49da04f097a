//! Lookup entry points.
//!
//! Each lookup opens exactly one page, runs its extraction, and closes the
//! page again whatever the outcome. The plain functions also launch and shut
//! down their own Chromium; the `_with` variants borrow a renderer.

use crate::attributes::{self, CharacterAttributes};
use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::meaning;
use crate::query::CodePoint;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderContext, Renderer};
use tracing::warn;

/// Attributes of a character or hex code point from the CNS11643 registry.
pub async fn get_character_attributes(
    input: &str,
    config: &LookupConfig,
) -> Result<CharacterAttributes, LookupError> {
    let code_point = CodePoint::parse(input)?;
    let renderer = launch(config).await?;
    let result = attributes_in_session(&renderer, &code_point, config).await;
    shutdown(renderer).await;
    result
}

/// Basic dictionary explanation of a character, or
/// [`meaning::MEANING_NOT_FOUND`].
pub async fn get_character_meaning(
    input: &str,
    config: &LookupConfig,
) -> Result<String, LookupError> {
    let character = parse_character(input)?;
    let renderer = launch(config).await?;
    let result = meaning_in_session(&renderer, character, config).await;
    shutdown(renderer).await;
    result
}

/// [`get_character_attributes`] on an existing renderer.
pub async fn get_character_attributes_with(
    renderer: &dyn Renderer,
    input: &str,
    config: &LookupConfig,
) -> Result<CharacterAttributes, LookupError> {
    let code_point = CodePoint::parse(input)?;
    attributes_in_session(renderer, &code_point, config).await
}

/// [`get_character_meaning`] on an existing renderer.
pub async fn get_character_meaning_with(
    renderer: &dyn Renderer,
    input: &str,
    config: &LookupConfig,
) -> Result<String, LookupError> {
    let character = parse_character(input)?;
    meaning_in_session(renderer, character, config).await
}

/// The character behind a meaning query. Hex code points are accepted too.
pub fn parse_character(input: &str) -> Result<char, LookupError> {
    CodePoint::parse(input)?
        .as_char()
        .ok_or_else(|| LookupError::invalid_input(input, "not a Unicode scalar value"))
}

async fn attributes_in_session(
    renderer: &dyn Renderer,
    code_point: &CodePoint,
    config: &LookupConfig,
) -> Result<CharacterAttributes, LookupError> {
    let mut context = renderer.new_context().await.map_err(LookupError::Launch)?;
    let result = attributes::extract(context.as_mut(), code_point, config).await;
    release(context).await;
    result
}

async fn meaning_in_session(
    renderer: &dyn Renderer,
    character: char,
    config: &LookupConfig,
) -> Result<String, LookupError> {
    let mut context = renderer.new_context().await.map_err(LookupError::Launch)?;
    let result = meaning::extract(context.as_mut(), character, config).await;
    release(context).await;
    result
}

async fn launch(config: &LookupConfig) -> Result<ChromiumRenderer, LookupError> {
    ChromiumRenderer::launch(&config.browser)
        .await
        .map_err(LookupError::Launch)
}

/// Close a page without letting a close failure mask the lookup result.
async fn release(context: Box<dyn RenderContext>) {
    if let Err(e) = context.close().await {
        warn!("failed to close page: {e:#}");
    }
}

async fn shutdown(renderer: ChromiumRenderer) {
    if let Err(e) = renderer.shutdown().await {
        warn!("failed to shut down browser: {e:#}");
    }
}
