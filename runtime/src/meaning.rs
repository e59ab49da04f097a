//! Basic-explanation lookup on the online dictionary.
//!
//! Entry pages mix the basic explanation with detailed explanations,
//! dictionary citations and etymology. The section is cut out of the page
//! text with marker strings:
//!
//! 1. `<char> 基本解釋` starts the section; it ends at the earliest of the
//!    [`SECTION_BOUNDARIES`] that follows.
//! 2. Without the marker, a [`FALLBACK_WINDOW`]-character window starting at
//!    the first occurrence of the character is used, or the start of the
//!    text when the character does not occur at all.
//!
//! This is a heuristic over rendered text, not a parser. Ambiguity resolves
//! to the first occurrence, and a markup change on the site shows up as
//! "not found" or a noisy window rather than an error.

use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::renderer::RenderContext;
use regex::Regex;
use tracing::{debug, info};
use url::Url;

/// Returned when the page yields no usable text.
pub const MEANING_NOT_FOUND: &str = "Meaning not found.";

/// Heading of the basic explanation section.
pub const BASIC_EXPLANATION: &str = "基本解釋";

/// Headings that can follow the basic explanation: detailed explanation,
/// Mandarin dictionary, Kangxi dictionary, Shuowen etymology, and the
/// copyright line closing the page.
pub const SECTION_BOUNDARIES: &[&str] = &["詳細解釋", "國語辭典", "康熙字典", "說文解字", "©"];

/// Characters kept when the section marker is missing.
pub const FALLBACK_WINDOW: usize = 300;

const BULLET: char = '●';

/// Content containers, most specific first.
const CONTENT_CONTAINERS: &[&str] = &[
    ".jbjs",
    "#jbjs",
    ".content.definitions",
    ".nr-box",
    ".res_c_center",
    "#content",
    "main",
    "article",
];

/// A container must carry more characters than this to be used.
const MIN_CONTAINER_TEXT: usize = 20;

/// Dictionary entry URL for `character`.
pub fn dictionary_url(base: &str, character: char) -> Result<Url, LookupError> {
    Url::parse(base)
        .and_then(|b| b.join(&character.to_string()))
        .map_err(|source| LookupError::InvalidUrl {
            url: base.to_string(),
            source,
        })
}

/// Script returning the text of the first substantial content container,
/// or the whole page text.
fn container_text_script() -> String {
    let selectors = serde_json::Value::from(CONTENT_CONTAINERS.to_vec());
    format!(
        r#"(() => {{
            const selectors = {selectors};
            for (const sel of selectors) {{
                const el = document.querySelector(sel);
                if (!el) continue;
                const text = (el.innerText || '').trim();
                if ([...text].length > {MIN_CONTAINER_TEXT}) return text;
            }}
            return document.body ? document.body.innerText : null;
        }})()"#
    )
}

/// Look up the basic explanation of `character` on an already-open page.
///
/// Fails only when the dictionary page cannot be loaded.
pub async fn extract(
    context: &mut dyn RenderContext,
    character: char,
    config: &LookupConfig,
) -> Result<String, LookupError> {
    let url = dictionary_url(&config.dictionary_url, character)?;
    info!(%character, %url, "querying dictionary");

    let nav = context
        .navigate(url.as_str(), config.dictionary_nav_timeout_ms)
        .await
        .map_err(|source| LookupError::Navigation {
            url: url.to_string(),
            source,
        })?;
    debug!(
        final_url = %nav.final_url,
        load_time_ms = nav.load_time_ms,
        "dictionary page loaded"
    );

    let text = match context.execute_js(&container_text_script()).await {
        Ok(value) => value.as_str().map(str::to_string),
        Err(e) => {
            debug!("reading page text: {e:#}");
            None
        }
    };

    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        debug!("dictionary page has no text");
        return Ok(MEANING_NOT_FOUND.to_string());
    };

    Ok(segment_meaning(&text, character))
}

/// Cut the basic explanation of `character` out of page text.
pub fn segment_meaning(text: &str, character: char) -> String {
    // A section holding only bullets or the header glyph counts as missing.
    let cleaned = basic_explanation(text, character)
        .map(|section| clean(section, character))
        .filter(|section| !section.is_empty())
        .unwrap_or_else(|| clean(fallback_window(text, character), character));

    if cleaned.is_empty() {
        MEANING_NOT_FOUND.to_string()
    } else {
        cleaned
    }
}

/// Text after the first `<character> 基本解釋`, up to the nearest section
/// boundary.
pub fn basic_explanation(text: &str, character: char) -> Option<&str> {
    if !text.contains(BASIC_EXPLANATION) {
        return None;
    }

    let pattern = format!(
        r"{}\s*{}",
        regex::escape(&character.to_string()),
        BASIC_EXPLANATION
    );
    let marker = Regex::new(&pattern).ok()?.find(text)?;
    let rest = &text[marker.end()..];

    let end = SECTION_BOUNDARIES
        .iter()
        .filter_map(|b| rest.find(b))
        .min()
        .unwrap_or(rest.len());

    Some(rest[..end].trim())
}

/// Up to [`FALLBACK_WINDOW`] characters from the first `character`, or from
/// the start of the text.
pub fn fallback_window(text: &str, character: char) -> &str {
    let start = text.find(character).unwrap_or(0);
    let window = &text[start..];
    match window.char_indices().nth(FALLBACK_WINDOW) {
        Some((end, _)) => &window[..end],
        None => window,
    }
}

/// Drop bullets, surrounding whitespace and a leading header copy of the
/// character.
fn clean(s: &str, character: char) -> String {
    let without_bullets: String = s.chars().filter(|&c| c != BULLET).collect();
    let mut out = without_bullets.trim();
    while let Some(rest) = out.strip_prefix(character) {
        out = rest.trim_start();
    }
    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_segment() {
        let text = "舡 基本解釋 船名。...詳細解釋...";
        assert_eq!(segment_meaning(text, '舡'), "船名。...");
    }

    #[test]
    fn test_marker_across_newline() {
        let text = "漢典\n舡\n基本解釋\n● 舡\nchuán\n古同「船」。\n詳細解釋\n...";
        assert_eq!(segment_meaning(text, '舡'), "chuán\n古同「船」。");
    }

    #[test]
    fn test_earliest_boundary_wins() {
        let text = "舡 基本解釋 船名。康熙字典 舟部 詳細解釋 更多";
        assert_eq!(basic_explanation(text, '舡'), Some("船名。"));
        let text = "舡 基本解釋 船名。詳細解釋 說文解字 ©漢典";
        assert_eq!(basic_explanation(text, '舡'), Some("船名。"));
    }

    #[test]
    fn test_first_marker_occurrence_wins() {
        let text = "舡 基本解釋 一 詳細解釋 舡 基本解釋 二 詳細解釋";
        assert_eq!(segment_meaning(text, '舡'), "一");
    }

    #[test]
    fn test_marker_without_boundary_runs_to_end() {
        let text = "舡 基本解釋 船名。";
        assert_eq!(segment_meaning(text, '舡'), "船名。");
    }

    #[test]
    fn test_label_for_other_character_falls_back() {
        // The heading belongs to 船, so the window starts at the first 舡.
        let text = "船 基本解釋 舟也。舡 同船";
        assert_eq!(basic_explanation(text, '舡'), None);
        assert_eq!(segment_meaning(text, '舡'), "同船");
    }

    #[test]
    fn test_empty_section_falls_back() {
        let text = "舡 基本解釋 詳細解釋 舡舟";
        assert_eq!(basic_explanation(text, '舡'), Some(""));
        // window starts at the first 舡, then leading copies are stripped
        assert_eq!(segment_meaning(text, '舡'), "基本解釋 詳細解釋 舡舟");
    }

    #[test]
    fn test_bullet_only_section_falls_back() {
        let text = "舡 基本解釋 ● 詳細解釋 舡 讀音 chuán 船也";
        assert_eq!(basic_explanation(text, '舡'), Some("●"));
        assert_eq!(
            segment_meaning(text, '舡'),
            "基本解釋  詳細解釋 舡 讀音 chuán 船也"
        );
    }

    #[test]
    fn test_fallback_window_from_character() {
        let prefix = "頁首導航".to_string();
        let body: String = std::iter::repeat('甲').take(400).collect();
        let text = format!("{prefix}舡{body}");
        let window = fallback_window(&text, '舡');
        assert_eq!(window.chars().count(), FALLBACK_WINDOW);
        assert!(window.starts_with('舡'));
    }

    #[test]
    fn test_fallback_window_without_character() {
        let text: String = std::iter::repeat('乙').take(500).collect();
        let window = fallback_window(&text, '舡');
        assert_eq!(window.chars().count(), FALLBACK_WINDOW);
        assert!(text.starts_with(window));

        assert_eq!(fallback_window("短文", '舡'), "短文");
    }

    #[test]
    fn test_output_has_no_bullet_or_leading_character() {
        let text = "舡 基本解釋 ●舡 ● 船名 ●";
        let meaning = segment_meaning(text, '舡');
        assert_eq!(meaning, "船名");
        assert!(!meaning.contains(BULLET));
        assert!(!meaning.starts_with('舡'));
    }

    #[test]
    fn test_blank_text_is_not_found() {
        assert_eq!(segment_meaning("  ●  ", '舡'), MEANING_NOT_FOUND);
    }

    #[test]
    fn test_dictionary_url_encodes_character() {
        let url = dictionary_url(crate::config::DEFAULT_DICTIONARY_URL, '數').unwrap();
        assert_eq!(url.as_str(), "https://www.zdic.net/hant/%E6%95%B8");
    }

    #[test]
    fn test_container_script_lists_selectors() {
        let script = container_text_script();
        assert!(script.contains(r##"[".jbjs","#jbjs""##));
        assert!(script.contains("[...text].length > 20"));
    }
}
