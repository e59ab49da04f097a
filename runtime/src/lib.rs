//! Han character lookups against the CNS11643 registry and an online
//! dictionary, driven through a headless browser.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tc_unicode::LookupError> {
//! let config = tc_unicode::LookupConfig::from_env();
//! let attrs = tc_unicode::get_character_attributes("數", &config).await?;
//! println!("{:?}", attrs.cns());
//! let meaning = tc_unicode::get_character_meaning("舡", &config).await?;
//! println!("{meaning}");
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod cli;
pub mod config;
pub mod error;
pub mod lookup;
pub mod meaning;
pub mod query;
pub mod renderer;

pub use attributes::CharacterAttributes;
pub use config::{BrowserOptions, LookupConfig};
pub use error::LookupError;
pub use lookup::{
    get_character_attributes, get_character_attributes_with, get_character_meaning,
    get_character_meaning_with,
};
pub use meaning::MEANING_NOT_FOUND;
pub use query::CodePoint;
