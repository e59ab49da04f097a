//! Lookup error taxonomy.
//!
//! Only input and session failures surface here. A field that cannot be
//! extracted is simply absent from the result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid input {input:?}: {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("invalid url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("browser session failed to start")]
    Launch(#[source] anyhow::Error),

    #[error("failed to load {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl LookupError {
    pub(crate) fn invalid_input(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
