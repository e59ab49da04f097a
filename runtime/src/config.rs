//! Lookup configuration: endpoints, timeouts, browser launch options.

use std::path::PathBuf;

/// Env var pointing at a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "TC_UNICODE_CHROMIUM_PATH";
/// Env var that disables the Chromium sandbox (needed in most containers).
pub const NO_SANDBOX_ENV: &str = "TC_UNICODE_CHROMIUM_NO_SANDBOX";
/// Env var that launches a visible browser window.
pub const HEADFUL_ENV: &str = "TC_UNICODE_HEADFUL";

/// CNS11643 registry search endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://www.cns11643.gov.tw/search.jsp";
/// Numeric search identifier the registry expects alongside `UNI`.
pub const REGISTRY_SEARCH_ID: &str = "12";
/// Dictionary entry path prefix; the character is appended.
pub const DEFAULT_DICTIONARY_URL: &str = "https://www.zdic.net/hant/";

/// How the browser is launched.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub no_sandbox: bool,
    /// Explicit Chromium binary. Discovered on `PATH` when unset.
    pub chromium_path: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: false,
            chromium_path: None,
        }
    }
}

/// Everything a lookup needs besides its input.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub registry_url: String,
    pub dictionary_url: String,
    /// Registry page load.
    pub registry_nav_timeout_ms: u64,
    /// Wait for the registry footer before touching the DOM.
    pub ready_timeout_ms: u64,
    /// Quick probe for the detail-page marker on the first page.
    pub detail_probe_timeout_ms: u64,
    /// Wait for the detail-page marker after following a list-page link.
    pub detail_timeout_ms: u64,
    /// Dictionary page load.
    pub dictionary_nav_timeout_ms: u64,
    pub browser: BrowserOptions,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            registry_nav_timeout_ms: 30_000,
            ready_timeout_ms: 10_000,
            detail_probe_timeout_ms: 2_000,
            detail_timeout_ms: 10_000,
            dictionary_nav_timeout_ms: 20_000,
            browser: BrowserOptions::default(),
        }
    }
}

impl LookupConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
            let path = PathBuf::from(&p);
            if path.exists() {
                config.browser.chromium_path = Some(path);
            } else {
                tracing::warn!("{CHROMIUM_PATH_ENV}={p} does not exist, ignoring");
            }
        }
        if env_flag(NO_SANDBOX_ENV) {
            config.browser.no_sandbox = true;
        }
        if env_flag(HEADFUL_ENV) {
            config.browser.headless = false;
        }

        config
    }
}

/// Set and not "0"/"false".
fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LookupConfig::default();
        assert_eq!(config.ready_timeout_ms, 10_000);
        assert_eq!(config.detail_timeout_ms, 10_000);
        assert_eq!(config.dictionary_nav_timeout_ms, 20_000);
        assert!(config.browser.headless);
        assert!(config.browser.chromium_path.is_none());
    }

    #[test]
    fn test_env_flag_unset() {
        assert!(!env_flag("TC_UNICODE_TEST_FLAG_THAT_IS_NEVER_SET"));
    }
}
